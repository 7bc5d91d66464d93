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

//! In-process producer for debug traces.
//!
//! The instrumented VM records traces through this builder; tests and demos use
//! it to write traces by hand.

use crate::types::{
    ComponentLayout, DebugTrace, FunctionId, FunctionInfo, NumberKind, SlotId, SlotInfo,
    TraceEvent,
};

/// Incrementally assembles a [`DebugTrace`]
///
/// ```ignore
/// let mut builder = DebugTraceBuilder::new();
/// let main = builder.function("int main()", 1);
/// let result = builder.result_slot(main, NumberKind::Signed);
/// builder.enter(main, 2).line(3).write(result, 4).exit(main, Some(result));
/// let trace = builder.build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DebugTraceBuilder {
    functions: Vec<FunctionInfo>,
    slots: Vec<SlotInfo>,
    events: Vec<TraceEvent>,
    source: Option<String>,
}

/* Metadata */
impl DebugTraceBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a function
    pub fn function(&mut self, name: impl Into<String>, return_slot_count: usize) -> FunctionId {
        self.functions.push(FunctionInfo::new(name, return_slot_count));
        FunctionId(self.functions.len() - 1)
    }

    /// Declare a slot from a full descriptor
    pub fn slot(&mut self, info: SlotInfo) -> SlotId {
        self.slots.push(info);
        SlotId(self.slots.len() - 1)
    }

    /// Declare a scalar variable
    pub fn scalar_slot(&mut self, name: &str, kind: NumberKind, line: i32) -> SlotId {
        self.slot(SlotInfo::scalar(name, kind, line))
    }

    /// Declare a vector variable with `len` components
    pub fn vector_slots(&mut self, name: &str, kind: NumberKind, len: u8, line: i32) -> Vec<SlotId> {
        let layouts = (0..len).map(|index| ComponentLayout::Vector { index });
        self.group(name, kind, line, None, layouts)
    }

    /// Declare a matrix variable; components are laid out row by row
    pub fn matrix_slots(
        &mut self,
        name: &str,
        kind: NumberKind,
        rows: u8,
        cols: u8,
        line: i32,
    ) -> Vec<SlotId> {
        let layouts =
            (0..rows).flat_map(|row| (0..cols).map(move |col| ComponentLayout::Matrix { row, col }));
        self.group(name, kind, line, None, layouts)
    }

    /// Declare the scalar result slot of `function`
    pub fn result_slot(&mut self, function: FunctionId, kind: NumberKind) -> SlotId {
        self.group("", kind, -1, Some(function), std::iter::once(ComponentLayout::Scalar))[0]
    }

    /// Declare a vector result of `function`
    pub fn result_vector_slots(
        &mut self,
        function: FunctionId,
        kind: NumberKind,
        len: u8,
    ) -> Vec<SlotId> {
        let layouts = (0..len).map(|index| ComponentLayout::Vector { index });
        self.group("", kind, -1, Some(function), layouts)
    }

    fn group(
        &mut self,
        name: &str,
        kind: NumberKind,
        line: i32,
        function_result: Option<FunctionId>,
        layouts: impl Iterator<Item = ComponentLayout>,
    ) -> Vec<SlotId> {
        layouts
            .enumerate()
            .map(|(group_index, layout)| {
                self.slot(SlotInfo {
                    name: name.to_string(),
                    group_index,
                    layout,
                    kind,
                    line,
                    function_result,
                })
            })
            .collect()
    }

    /// Attach source text to the trace
    pub fn source(&mut self, text: &str) -> &mut Self {
        self.source = Some(text.to_string());
        self
    }
}

/* Events */
impl DebugTraceBuilder {
    /// Append a raw event
    pub fn event(&mut self, event: TraceEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Record a call into `function`
    pub fn enter(&mut self, function: FunctionId, line: i32) -> &mut Self {
        self.event(TraceEvent::Enter { function, line })
    }

    /// Record a return from `function`
    pub fn exit(&mut self, function: FunctionId, result: Option<SlotId>) -> &mut Self {
        self.event(TraceEvent::Exit { function, result })
    }

    /// Record reaching `line`
    pub fn line(&mut self, line: i32) -> &mut Self {
        self.event(TraceEvent::Line { line })
    }

    /// Record opening a scope
    pub fn scope_enter(&mut self) -> &mut Self {
        self.event(TraceEvent::EnterScope)
    }

    /// Record closing a scope
    pub fn scope_exit(&mut self) -> &mut Self {
        self.event(TraceEvent::ExitScope)
    }

    /// Record an integer write
    pub fn write(&mut self, slot: SlotId, value: i32) -> &mut Self {
        self.event(TraceEvent::Write { slot, value })
    }

    /// Record a float write
    pub fn write_f32(&mut self, slot: SlotId, value: f32) -> &mut Self {
        self.write(slot, value.to_bits() as i32)
    }

    /// Record a boolean write; `true` is stored with all bits set, like a VM lane mask
    pub fn write_bool(&mut self, slot: SlotId, value: bool) -> &mut Self {
        self.write(slot, if value { -1 } else { 0 })
    }

    /// Number of events recorded so far
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Finish the trace
    pub fn build(self) -> DebugTrace {
        let trace = DebugTrace::new(self.functions, self.slots, self.events);
        match self.source {
            Some(text) => trace.with_source(&text),
            None => trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_slots_are_grouped() {
        let mut builder = DebugTraceBuilder::new();
        let a = builder.scalar_slot("a", NumberKind::Signed, 2);
        let m = builder.matrix_slots("m", NumberKind::Float, 2, 3, 3);
        let trace = builder.build();

        assert_eq!(a, SlotId(0));
        assert_eq!(m.len(), 6);
        assert_eq!(trace.component_suffix(m[1]).unwrap(), "[0][1]");
        assert_eq!(trace.component_suffix(m[3]).unwrap(), "[1][0]");
        assert_eq!(trace.slot_group(m[4]).unwrap(), m);
    }

    #[test]
    fn test_bool_and_float_writes() {
        let mut builder = DebugTraceBuilder::new();
        let b = builder.scalar_slot("b", NumberKind::Boolean, 1);
        builder.write_bool(b, true).write_f32(b, 2.5);

        assert_eq!(builder.event_count(), 2);
        let trace = builder.build();
        assert_eq!(trace.events()[0], TraceEvent::Write { slot: b, value: -1 });
        assert_eq!(trace.events()[1], TraceEvent::Write { slot: b, value: 2.5f32.to_bits() as i32 });
    }
}
