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

//! The trace player: a cursor over a [`DebugTrace`] that steps through the
//! recorded run one statement at a time.
//!
//! The player keeps a call stack mirroring the recorded run, the last value
//! written to every slot, and the set of slots written by the most recent
//! stepping call (the "dirty" slots). Its stepping engine lives in `step.rs`.

mod frame;
mod step;

pub use frame::{result_owner, ResultOwner};

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tdb_common::types::{DebugTrace, FunctionId, SlotId, TraceEvent};
use tracing::debug;

use crate::PlayerError;
use frame::{FrameVariables, StackFrame};

/// A variable shown in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableData {
    /// The slot holding this component
    pub slot: SlotId,
    /// Raw value, interpret with [`DebugTrace::format_value`]
    pub value: i32,
    /// Whether the most recent stepping call wrote this slot
    pub dirty: bool,
}

/// Replays a recorded [`DebugTrace`].
///
/// A player is constructed empty and bound to a trace with [`reset`](Self::reset).
/// Any number of players may share one trace.
///
/// ```ignore
/// let mut player = TracePlayer::new();
/// player.reset(Arc::new(samples::hello_world()));
/// player.step()?;
/// assert_eq!(player.current_line(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracePlayer {
    trace: Option<Arc<DebugTrace>>,
    /// Index of the next event to apply
    cursor: usize,
    /// Set once a stepping call has run since the last reset
    started: bool,
    stack: Vec<StackFrame>,
    /// Variables declared outside every function, and results of outermost calls
    globals: FrameVariables,
    values: Vec<Option<i32>>,
    dirty: BTreeSet<SlotId>,
    breakpoints: BTreeSet<i32>,
    /// Line markers not yet consumed, per line
    line_hits: BTreeMap<i32, usize>,
}

impl TracePlayer {
    /// Create a player with no trace loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a player and bind it to `trace`
    pub fn with_trace(trace: Arc<DebugTrace>) -> Self {
        let mut player = Self::new();
        player.reset(trace);
        player
    }

    /// Bind the player to `trace` and rewind to before the first event.
    ///
    /// Breakpoints are kept.
    pub fn reset(&mut self, trace: Arc<DebugTrace>) {
        self.cursor = 0;
        self.started = false;
        self.stack.clear();
        self.globals = FrameVariables::default();
        self.values = vec![None; trace.slot_count()];
        self.dirty.clear();
        self.line_hits.clear();
        for event in trace.events() {
            if let TraceEvent::Line { line } = event {
                *self.line_hits.entry(*line).or_default() += 1;
            }
        }

        debug!(
            events = trace.len(),
            slots = trace.slot_count(),
            functions = trace.function_count(),
            "Trace player reset"
        );
        self.trace = Some(trace);
    }

    /// The trace this player is bound to
    pub fn trace(&self) -> Option<&Arc<DebugTrace>> {
        self.trace.as_ref()
    }
}

/* Introspection */
impl TracePlayer {
    /// Index of the next event to apply
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Line of the innermost frame, or -1 when no function is active
    pub fn current_line(&self) -> i32 {
        self.stack.last().map_or(-1, |frame| frame.line)
    }

    /// Line of the frame at `frame_index` (0 = outermost)
    pub fn current_line_in_frame(&self, frame_index: usize) -> Result<i32, PlayerError> {
        self.frame(frame_index).map(|frame| frame.line)
    }

    /// Whether the whole trace has been replayed.
    ///
    /// A freshly reset player has not completed, even for an empty trace.
    pub fn trace_has_completed(&self) -> bool {
        self.started && self.trace.as_ref().is_some_and(|trace| self.cursor >= trace.len())
    }

    /// Functions on the call stack, outermost first
    pub fn call_stack(&self) -> Vec<FunctionId> {
        self.stack.iter().map(|frame| frame.function).collect()
    }

    /// Number of active frames
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Variables visible in the frame at `frame_index` (0 = outermost).
    ///
    /// Slots are listed in declaration order, followed by the results of calls
    /// that returned into this frame during the last step.
    pub fn local_variables(&self, frame_index: usize) -> Result<Vec<VariableData>, PlayerError> {
        let frame = self.frame(frame_index)?;
        Ok(self.variables_of(&frame.variables))
    }

    /// Variables declared outside every function, plus results of outermost calls
    pub fn global_variables(&self) -> Vec<VariableData> {
        self.variables_of(&self.globals)
    }

    /// Last value written to `slot`, if any
    pub fn slot_value(&self, slot: SlotId) -> Option<i32> {
        self.values.get(slot.index()).copied().flatten()
    }

    /// Slots written by the most recent stepping call
    pub fn dirty_slots(&self) -> &BTreeSet<SlotId> {
        &self.dirty
    }

    /// Remaining executions of each line, counted over the unconsumed events
    pub fn line_hit_counts(&self) -> &BTreeMap<i32, usize> {
        &self.line_hits
    }

    fn frame(&self, frame_index: usize) -> Result<&StackFrame, PlayerError> {
        self.stack
            .get(frame_index)
            .ok_or(PlayerError::FrameOutOfRange { index: frame_index, depth: self.stack.len() })
    }

    fn variables_of(&self, variables: &FrameVariables) -> Vec<VariableData> {
        variables
            .visible()
            .map(|slot| VariableData {
                slot,
                value: self.slot_value(slot).unwrap_or_default(),
                dirty: self.dirty.contains(&slot),
            })
            .collect()
    }
}

/* Breakpoints */
impl TracePlayer {
    /// Replace all breakpoints
    pub fn set_breakpoints(&mut self, lines: impl IntoIterator<Item = i32>) {
        self.breakpoints = lines.into_iter().collect();
    }

    /// Add a breakpoint; returns false if it was already set
    pub fn add_breakpoint(&mut self, line: i32) -> bool {
        self.breakpoints.insert(line)
    }

    /// Remove a breakpoint; returns false if it was not set
    pub fn remove_breakpoint(&mut self, line: i32) -> bool {
        self.breakpoints.remove(&line)
    }

    /// Breakpoint lines, ascending
    pub fn breakpoints(&self) -> &BTreeSet<i32> {
        &self.breakpoints
    }

    /// Whether the current line has a breakpoint
    pub fn at_breakpoint(&self) -> bool {
        self.breakpoints.contains(&self.current_line())
    }
}
