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

//! The debug trace: an immutable record of one instrumented program run

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    types::{FunctionId, FunctionInfo, NumberKind, SlotId, SlotInfo},
    TraceError,
};

/// One atomic occurrence recorded while the program ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A function was called
    Enter {
        /// The callee
        function: FunctionId,
        /// Line of the function's declaration
        line: i32,
    },
    /// A function returned
    Exit {
        /// The function that returned; must match the innermost active frame
        function: FunctionId,
        /// First slot of the function's result, if it returns a value
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<SlotId>,
    },
    /// Execution reached a new source line in the current function
    Line {
        /// The line number
        line: i32,
    },
    /// A lexical scope was opened
    EnterScope,
    /// The innermost lexical scope was closed
    ExitScope,
    /// A slot was assigned
    Write {
        /// The slot written
        slot: SlotId,
        /// Raw 32-bit value, interpreted by the slot's [`NumberKind`]
        value: i32,
    },
}

impl TraceEvent {
    /// Whether stepping may come to rest right after this event
    pub fn is_stopping_point(&self) -> bool {
        matches!(self, Self::Line { .. } | Self::Exit { .. })
    }
}

/// Immutable record of a program run together with its function and slot metadata.
///
/// The event log only contains the path that was actually taken; branches that
/// did not execute leave no trace. A trace is meant to be wrapped in an `Arc`
/// and shared between any number of players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugTrace {
    functions: Vec<FunctionInfo>,
    slots: Vec<SlotInfo>,
    events: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    source: Vec<String>,
}

impl DebugTrace {
    /// Create a trace from its parts
    pub fn new(functions: Vec<FunctionInfo>, slots: Vec<SlotInfo>, events: Vec<TraceEvent>) -> Self {
        Self { functions, slots, events, source: Vec::new() }
    }

    /// Attach the program's source text; line `n` of the trace maps to line `n` of the text
    pub fn with_source(mut self, text: &str) -> Self {
        // Line numbers are 1-based, keep index 0 as an empty placeholder.
        self.source = std::iter::once(String::new()).chain(text.lines().map(String::from)).collect();
        self
    }

    /// All function descriptors, indexed by [`FunctionId`]
    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    /// All slot descriptors, indexed by [`SlotId`]
    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    /// The recorded event log
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Source text by line number, empty when unknown
    pub fn source(&self) -> &[String] {
        &self.source
    }

    /// Source text of one line, if known
    pub fn source_line(&self, line: i32) -> Option<&str> {
        usize::try_from(line).ok().and_then(|line| self.source.get(line)).map(String::as_str)
    }

    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of functions
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the event log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up a slot descriptor
    pub fn slot(&self, slot: SlotId) -> Result<&SlotInfo, TraceError> {
        self.slots
            .get(slot.index())
            .ok_or(TraceError::UnknownSlot { slot, count: self.slots.len() })
    }

    /// Look up a function descriptor
    pub fn function(&self, function: FunctionId) -> Result<&FunctionInfo, TraceError> {
        self.functions
            .get(function.index())
            .ok_or(TraceError::UnknownFunction { function, count: self.functions.len() })
    }

    /// Display suffix of a slot: `""`, `.x`..`.w`, or `[row][col]`
    pub fn component_suffix(&self, slot: SlotId) -> Result<String, TraceError> {
        Ok(self.slot(slot)?.layout.suffix())
    }

    /// Render a raw value stored in `slot` as text
    pub fn format_value(&self, slot: SlotId, raw: i32) -> Result<String, TraceError> {
        Ok(self.slot(slot)?.kind.format_raw(raw))
    }

    /// Variable name shown for a slot; result slots are named `[fn].result`
    pub fn slot_display_name(&self, slot: SlotId) -> Result<String, TraceError> {
        let info = self.slot(slot)?;
        match info.function_result {
            Some(function) => Ok(format!("[{}].result", self.function(function)?.short_name())),
            None => Ok(info.name.clone()),
        }
    }

    /// All slots belonging to the same variable as `slot`, in component order
    pub fn slot_group(&self, slot: SlotId) -> Result<Vec<SlotId>, TraceError> {
        let info = self.slot(slot)?;
        let start = slot.index().saturating_sub(info.group_index);
        let mut group = vec![SlotId(start)];
        group.extend(
            (start + 1..self.slots.len())
                .take_while(|&index| self.slots[index].group_index != 0)
                .map(SlotId),
        );
        Ok(group)
    }

    /// Check that the event log is well nested and only references known ids.
    ///
    /// Players assume this holds and panic otherwise; run it on traces that come
    /// from outside the process.
    pub fn validate(&self) -> Result<(), TraceError> {
        // (function, open scopes) for every active frame
        let mut frames: Vec<(FunctionId, usize)> = Vec::new();
        let mut global_scopes = 0usize;
        let mut written = vec![false; self.slots.len()];

        for (position, event) in self.events.iter().enumerate() {
            match *event {
                TraceEvent::Enter { function, .. } => {
                    self.function(function)?;
                    frames.push((function, 0));
                }
                TraceEvent::Exit { function, result } => {
                    let Some((active, _)) = frames.pop() else {
                        return Err(TraceError::malformed(position, "exit with no active function"));
                    };
                    if active != function {
                        return Err(TraceError::malformed(
                            position,
                            format!("exit of function {function} while function {active} is active"),
                        ));
                    }
                    if let Some(slot) = result {
                        if self.slot(slot)?.function_result != Some(function) {
                            return Err(TraceError::malformed(
                                position,
                                format!("slot {slot} is not a result of function {function}"),
                            ));
                        }
                        if let Some(unwritten) =
                            self.slot_group(slot)?.into_iter().find(|s| !written[s.index()])
                        {
                            return Err(TraceError::malformed(
                                position,
                                format!("result slot {unwritten} was never written"),
                            ));
                        }
                    }
                }
                TraceEvent::Line { .. } => {
                    if frames.is_empty() {
                        return Err(TraceError::malformed(position, "line marker outside of a function"));
                    }
                }
                TraceEvent::EnterScope => match frames.last_mut() {
                    Some((_, scopes)) => *scopes += 1,
                    None => global_scopes += 1,
                },
                TraceEvent::ExitScope => {
                    let open = match frames.last_mut() {
                        Some((_, scopes)) => scopes,
                        None => &mut global_scopes,
                    };
                    if *open == 0 {
                        return Err(TraceError::malformed(position, "scope exit without a matching enter"));
                    }
                    *open -= 1;
                }
                TraceEvent::Write { slot, .. } => {
                    self.slot(slot)?;
                    written[slot.index()] = true;
                }
            }
        }

        if let Some((function, _)) = frames.last() {
            return Err(TraceError::malformed(
                self.events.len(),
                format!("function {function} never exits"),
            ));
        }
        if global_scopes != 0 {
            return Err(TraceError::malformed(self.events.len(), "global scope never closed"));
        }
        Ok(())
    }

    /// Serialize the trace as pretty-printed JSON
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a trace from JSON text
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a JSON trace from a reader
    pub fn read_from(reader: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Write the trace as JSON to a writer
    pub fn write_to(&self, writer: impl Write) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    /// Write a human-readable listing of functions, slots and events.
    ///
    /// Events are indented by call depth.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Functions:")?;
        for (index, function) in self.functions.iter().enumerate() {
            writeln!(out, "  F{index} = {}", function.name)?;
        }

        writeln!(out, "Slots:")?;
        for index in 0..self.slots.len() {
            let slot = SlotId(index);
            let info = &self.slots[index];
            writeln!(
                out,
                "  ${index} = {}{} ({}, L{})",
                self.slot_display_name(slot).unwrap_or_else(|_| "???".to_string()),
                info.layout.suffix(),
                kind_label(info.kind),
                info.line
            )?;
        }

        writeln!(out, "Events:")?;
        let mut depth = 0usize;
        for (position, event) in self.events.iter().enumerate() {
            if matches!(event, TraceEvent::Exit { .. }) {
                depth = depth.saturating_sub(1);
            }
            let indent = "  ".repeat(depth);
            match *event {
                TraceEvent::Enter { function, .. } => {
                    writeln!(out, "  [{position}] {indent}enter {}", self.function_name(function))?;
                    depth += 1;
                }
                TraceEvent::Exit { function, result } => {
                    let result = result.map(|slot| format!(" -> ${slot}")).unwrap_or_default();
                    writeln!(
                        out,
                        "  [{position}] {indent}exit {}{result}",
                        self.function_name(function)
                    )?;
                }
                TraceEvent::Line { line } => writeln!(out, "  [{position}] {indent}line {line}")?,
                TraceEvent::EnterScope => writeln!(out, "  [{position}] {indent}scope +1")?,
                TraceEvent::ExitScope => writeln!(out, "  [{position}] {indent}scope -1")?,
                TraceEvent::Write { slot, value } => {
                    let name = self.slot_display_name(slot).unwrap_or_else(|_| "???".to_string());
                    let suffix = self.component_suffix(slot).unwrap_or_default();
                    let value =
                        self.format_value(slot, value).unwrap_or_else(|_| value.to_string());
                    writeln!(out, "  [{position}] {indent}{name}{suffix} = {value}")?;
                }
            }
        }
        Ok(())
    }

    fn function_name(&self, function: FunctionId) -> &str {
        self.function(function).map(|f| f.name.as_str()).unwrap_or("???")
    }
}

fn kind_label(kind: NumberKind) -> &'static str {
    match kind {
        NumberKind::Signed => "int",
        NumberKind::Unsigned => "uint",
        NumberKind::Float => "float",
        NumberKind::Boolean => "bool",
    }
}

impl<'a> IntoIterator for &'a DebugTrace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentLayout, DebugTraceBuilder};

    fn sample_trace() -> DebugTrace {
        let mut builder = DebugTraceBuilder::new();
        let main = builder.function("int main()", 1);
        let result = builder.result_slot(main, NumberKind::Signed);
        let color = builder.vector_slots("color", NumberKind::Float, 4, 3);
        builder
            .enter(main, 2)
            .scope_enter()
            .line(3)
            .write_f32(color[0], 0.5)
            .write_f32(color[1], 1.0)
            .write_f32(color[2], 0.0)
            .write_f32(color[3], -1.0)
            .line(4)
            .write(result, 4)
            .scope_exit()
            .exit(main, Some(result));
        builder.build()
    }

    #[test]
    fn test_display_helpers() {
        let trace = sample_trace();
        assert_eq!(trace.slot_display_name(SlotId(0)).unwrap(), "[main].result");
        assert_eq!(trace.component_suffix(SlotId(0)).unwrap(), "");
        assert_eq!(trace.component_suffix(SlotId(2)).unwrap(), ".y");
        assert_eq!(trace.format_value(SlotId(2), 1.0f32.to_bits() as i32).unwrap(), "1");
        assert_eq!(trace.format_value(SlotId(0), 4).unwrap(), "4");
    }

    #[test]
    fn test_unknown_slot_is_reported() {
        let trace = sample_trace();
        assert_eq!(
            trace.component_suffix(SlotId(99)),
            Err(TraceError::UnknownSlot { slot: SlotId(99), count: 5 })
        );
        assert!(matches!(trace.format_value(SlotId(5), 0), Err(TraceError::UnknownSlot { .. })));
    }

    #[test]
    fn test_slot_group_spans_components() {
        let trace = sample_trace();
        let expected: Vec<SlotId> = (1..5).map(SlotId).collect();
        assert_eq!(trace.slot_group(SlotId(3)).unwrap(), expected);
        assert_eq!(trace.slot_group(SlotId(0)).unwrap(), vec![SlotId(0)]);
        assert_eq!(trace.slots()[4].layout, ComponentLayout::Vector { index: 3 });
    }

    #[test]
    fn test_validate_accepts_well_formed_trace() {
        assert_eq!(sample_trace().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_unbalanced_exit() {
        let functions = vec![FunctionInfo::new("void main()", 0)];
        let events = vec![TraceEvent::Exit { function: FunctionId(0), result: None }];
        let trace = DebugTrace::new(functions, vec![], events);
        assert!(matches!(trace.validate(), Err(TraceError::Malformed { position: 0, .. })));
    }

    #[test]
    fn test_validate_rejects_unwritten_result() {
        let mut builder = DebugTraceBuilder::new();
        let main = builder.function("int main()", 1);
        let result = builder.result_slot(main, NumberKind::Signed);
        builder.enter(main, 1).line(2).exit(main, Some(result));
        let err = builder.build().validate().unwrap_err();
        assert!(err.to_string().contains("never written"), "{err}");
    }

    #[test]
    fn test_validate_rejects_open_frame() {
        let mut builder = DebugTraceBuilder::new();
        let main = builder.function("void main()", 0);
        builder.enter(main, 1).line(2);
        assert!(matches!(builder.build().validate(), Err(TraceError::Malformed { position: 2, .. })));
    }

    #[test]
    fn test_dump_lists_events_by_depth() {
        let mut out = Vec::new();
        sample_trace().dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("F0 = int main()"));
        assert!(text.contains("$0 = [main].result (int, L-1)"));
        assert!(text.contains("$2 = color.y (float, L3)"));
        assert!(text.contains("[0] enter int main()"));
        assert!(text.contains("[3]   color.x = 0.5"));
        assert!(text.contains("[10] exit int main() -> $0"));
    }

    #[test]
    fn test_json_round_trip_preserves_source() {
        let trace = sample_trace().with_source("\nint main() {\n    return 4;\n}");
        let json = trace.to_json_string().unwrap();
        assert!(json.contains("\"op\": \"enter_scope\""));

        let parsed = DebugTrace::from_json_str(&json).unwrap();
        assert_eq!(parsed, trace);
        assert_eq!(parsed.source_line(3), Some("    return 4;"));
        assert_eq!(parsed.source_line(-1), None);
    }

    #[test]
    fn test_file_round_trip() {
        let trace = sample_trace();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        trace.write_to(&mut file).unwrap();

        let parsed = DebugTrace::read_from(std::fs::File::open(file.path()).unwrap()).unwrap();
        assert_eq!(parsed, trace);
    }
}
