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

//! The stepping engine.
//!
//! Every stepping call applies events from the cursor onwards. A line marker
//! or a function exit is a stopping point; the operations differ only in which
//! stopping points they come to rest on.

use std::sync::Arc;

use tdb_common::types::{DebugTrace, TraceEvent};
use tracing::{debug, trace};

use super::{
    frame::{result_owner, FrameVariables, ResultOwner, StackFrame},
    TracePlayer,
};
use crate::PlayerError;

impl TracePlayer {
    /// Advance by one statement, at whatever call depth it occurs.
    ///
    /// Entering a call stops on the callee's first line; returning stops right
    /// after the callee's frame is popped.
    pub fn step(&mut self) -> Result<(), PlayerError> {
        let Some(trace) = self.begin_step()? else { return Ok(()) };
        while self.cursor < trace.len() {
            if self.execute(&trace) {
                break;
            }
        }
        self.finish_step("step");
        Ok(())
    }

    /// Advance by one statement in the current frame, running through any calls.
    ///
    /// Stopping points reached inside deeper frames are skipped unless they sit
    /// on a breakpoint.
    pub fn step_over(&mut self) -> Result<(), PlayerError> {
        let Some(trace) = self.begin_step()? else { return Ok(()) };
        let initial_depth = self.stack.len();
        while self.cursor < trace.len() {
            let can_stop_here = self.stack.len() <= initial_depth;
            if self.execute(&trace) && (can_stop_here || self.at_breakpoint()) {
                break;
            }
        }
        self.finish_step("step over");
        Ok(())
    }

    /// Run until the current function returns, stopping in its caller.
    ///
    /// Stops early on a breakpoint. With no active function this runs to the end.
    pub fn step_out(&mut self) -> Result<(), PlayerError> {
        let Some(trace) = self.begin_step()? else { return Ok(()) };
        let initial_depth = self.stack.len();
        while self.cursor < trace.len() {
            if self.execute(&trace) && (self.stack.len() < initial_depth || self.at_breakpoint()) {
                break;
            }
        }
        self.finish_step("step out");
        Ok(())
    }

    /// Run until a stopping point lands on a breakpoint, or to the end of the trace
    pub fn run(&mut self) -> Result<(), PlayerError> {
        let Some(trace) = self.begin_step()? else { return Ok(()) };
        while self.cursor < trace.len() {
            if self.execute(&trace) && self.at_breakpoint() {
                break;
            }
        }
        self.finish_step("run");
        Ok(())
    }

    /// Prepare a stepping call; `None` when the trace has already completed.
    ///
    /// Clears the dirty set and drops results shown in the innermost frame,
    /// since a result is only displayed for the step in which its call returned.
    fn begin_step(&mut self) -> Result<Option<Arc<DebugTrace>>, PlayerError> {
        let trace = self.trace.clone().ok_or(PlayerError::NotReset)?;
        if self.trace_has_completed() {
            debug!(cursor = self.cursor, "Trace already completed, nothing to step");
            return Ok(None);
        }

        self.started = true;
        self.dirty.clear();
        if let Some(frame) = self.stack.last_mut() {
            frame.variables.clear_results();
        }
        Ok(Some(trace))
    }

    fn finish_step(&self, operation: &str) {
        debug!(
            operation,
            cursor = self.cursor,
            line = self.current_line(),
            depth = self.stack.len(),
            dirty = self.dirty.len(),
            completed = self.trace_has_completed(),
            "Stepping finished"
        );
    }

    /// Apply the event at the cursor and advance past it.
    ///
    /// Returns true if the event is a stopping point.
    ///
    /// # Panics
    ///
    /// Panics on malformed traces: unbalanced frames or scopes, unknown ids, or
    /// results that were never written.
    fn execute(&mut self, trace: &DebugTrace) -> bool {
        let position = self.cursor;
        let event = trace.events()[position];
        self.cursor += 1;
        trace!(position, ?event, "Applying trace event");

        match event {
            TraceEvent::Enter { function, line } => {
                assert!(
                    function.index() < trace.function_count(),
                    "event {position}: unknown function {function}"
                );
                self.stack.push(StackFrame::new(function, line));
            }
            TraceEvent::Exit { function, result } => {
                let frame = self
                    .stack
                    .pop()
                    .unwrap_or_else(|| panic!("event {position}: exit with no active function"));
                assert_eq!(
                    frame.function, function,
                    "event {position}: exit does not match the active function"
                );

                if let Some(first) = result {
                    let group = trace
                        .slot_group(first)
                        .unwrap_or_else(|err| panic!("event {position}: {err}"));
                    for slot in &group {
                        assert!(
                            self.slot_value(*slot).is_some(),
                            "event {position}: result slot {slot} was never written"
                        );
                        self.dirty.insert(*slot);
                    }
                    match result_owner(self.stack.len()) {
                        ResultOwner::Frame(index) => self.stack[index].variables.attach_results(&group),
                        ResultOwner::Global => self.globals.attach_results(&group),
                    }
                }
                return true;
            }
            TraceEvent::Line { line } => {
                let frame = self
                    .stack
                    .last_mut()
                    .unwrap_or_else(|| panic!("event {position}: line marker outside of a function"));
                frame.line = line;
                if let Some(hits) = self.line_hits.get_mut(&line) {
                    *hits = hits.saturating_sub(1);
                }
                return true;
            }
            TraceEvent::EnterScope => {
                let variables = self.innermost_variables();
                variables.enter_scope();
                trace!(position, depth = variables.scope_depth(), "Scope opened");
            }
            TraceEvent::ExitScope => {
                let closed = self.innermost_variables().exit_scope();
                trace!(position, hidden = closed.declared.len(), "Scope closed");
            }
            TraceEvent::Write { slot, value } => {
                let info = trace.slot(slot).unwrap_or_else(|err| panic!("event {position}: {err}"));
                self.values[slot.index()] = Some(value);
                self.dirty.insert(slot);
                // Results become visible when their function exits.
                if !info.is_function_result() {
                    self.innermost_variables().declare(slot);
                }
            }
        }
        false
    }

    /// Variables of the innermost frame, or the globals when no function is active
    fn innermost_variables(&mut self) -> &mut FrameVariables {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.variables,
            None => &mut self.globals,
        }
    }
}
