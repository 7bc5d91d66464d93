// TDB - Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Call frames and the lexical scopes they own

use tdb_common::types::{FunctionId, SlotId};

/// A lexical scope and the slots first written while it was innermost
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    pub(crate) declared: Vec<SlotId>,
}

/// Variables visible in one frame: its open scopes plus attached results.
///
/// The global frame uses the same structure with no function attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameVariables {
    scopes: Vec<Scope>,
    results: Vec<SlotId>,
}

impl Default for FrameVariables {
    fn default() -> Self {
        Self { scopes: vec![Scope::default()], results: Vec::new() }
    }
}

impl FrameVariables {
    /// Whether `slot` is listed in an open scope or as a result
    pub(crate) fn is_visible(&self, slot: SlotId) -> bool {
        self.results.contains(&slot) || self.scopes.iter().any(|s| s.declared.contains(&slot))
    }

    /// Declare `slot` in the innermost scope unless it is already visible
    pub(crate) fn declare(&mut self, slot: SlotId) {
        if self.is_visible(slot) {
            return;
        }
        match self.scopes.last_mut() {
            Some(scope) => scope.declared.push(slot),
            None => panic!("slot {slot} written with no open scope"),
        }
    }

    pub(crate) fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope; its slots stop being visible here
    pub(crate) fn exit_scope(&mut self) -> Scope {
        self.scopes.pop().unwrap_or_else(|| panic!("scope exit without a matching enter"))
    }

    /// Number of scopes currently open
    pub(crate) fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn attach_results(&mut self, slots: &[SlotId]) {
        for slot in slots {
            if !self.results.contains(slot) {
                self.results.push(*slot);
            }
        }
    }

    pub(crate) fn clear_results(&mut self) {
        self.results.clear();
    }

    /// Visible slots: scopes in entry order, then results in attach order
    pub(crate) fn visible(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.scopes.iter().flat_map(|s| s.declared.iter().copied()).chain(self.results.iter().copied())
    }
}

/// The activation record of one function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StackFrame {
    pub(crate) function: FunctionId,
    pub(crate) line: i32,
    pub(crate) variables: FrameVariables,
}

impl StackFrame {
    pub(crate) fn new(function: FunctionId, line: i32) -> Self {
        Self { function, line, variables: FrameVariables::default() }
    }
}

/// Where a returning function's result is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOwner {
    /// As a local of the frame at this index (0 = outermost)
    Frame(usize),
    /// In the global variable listing
    Global,
}

/// Decide who shows a result, given the stack depth right after the callee's frame was popped
pub fn result_owner(depth_after_pop: usize) -> ResultOwner {
    match depth_after_pop {
        0 => ResultOwner::Global,
        depth => ResultOwner::Frame(depth - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_owner() {
        assert_eq!(result_owner(0), ResultOwner::Global);
        assert_eq!(result_owner(1), ResultOwner::Frame(0));
        assert_eq!(result_owner(3), ResultOwner::Frame(2));
    }

    #[test]
    fn test_declare_keeps_outer_declaration() {
        let mut vars = FrameVariables::default();
        vars.declare(SlotId(1));
        vars.enter_scope();
        vars.declare(SlotId(1));
        vars.declare(SlotId(2));
        assert_eq!(vars.visible().collect::<Vec<_>>(), vec![SlotId(1), SlotId(2)]);

        let closed = vars.exit_scope();
        assert_eq!(closed.declared, vec![SlotId(2)]);
        assert!(vars.is_visible(SlotId(1)));
        assert!(!vars.is_visible(SlotId(2)));
    }

    #[test]
    fn test_results_follow_scoped_slots() {
        let mut vars = FrameVariables::default();
        vars.attach_results(&[SlotId(0)]);
        vars.declare(SlotId(4));
        vars.attach_results(&[SlotId(0), SlotId(7)]);
        assert_eq!(vars.visible().collect::<Vec<_>>(), vec![SlotId(4), SlotId(0), SlotId(7)]);

        vars.clear_results();
        assert_eq!(vars.visible().collect::<Vec<_>>(), vec![SlotId(4)]);
        assert_eq!(vars.scope_depth(), 1);
    }

    #[test]
    #[should_panic(expected = "scope exit without a matching enter")]
    fn test_unbalanced_scope_exit_panics() {
        let mut vars = FrameVariables::default();
        vars.exit_scope();
        vars.exit_scope();
    }
}
