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

//! Text rendering of call stacks and variable listings

use itertools::Itertools;
use tdb_common::types::DebugTrace;

use crate::{PlayerError, TracePlayer, VariableData};

/// Marker prepended to variables written by the last step
pub const DIRTY_MARKER: &str = "##";

/// Render the call stack as `int main() -> int fnA()`; unknown ids render as `???`
pub fn stack_string(trace: &DebugTrace, player: &TracePlayer) -> String {
    player
        .call_stack()
        .into_iter()
        .map(|function| trace.function(function).map_or("???", |info| info.name.as_str()))
        .join(" -> ")
}

/// Render one variable as `name.suffix = value`, prefixed by `dirty_marker` when dirty
pub fn format_variable(trace: &DebugTrace, var: &VariableData, dirty_marker: &str) -> String {
    let (Ok(name), Ok(suffix), Ok(value)) = (
        trace.slot_display_name(var.slot),
        trace.component_suffix(var.slot),
        trace.format_value(var.slot, var.value),
    ) else {
        return "???".to_string();
    };
    let marker = if var.dirty { dirty_marker } else { "" };
    format!("{marker}{name}{suffix} = {value}")
}

/// Render a listing as `a = 1, ##b = true` using a custom dirty marker
pub fn format_variables(trace: &DebugTrace, vars: &[VariableData], dirty_marker: &str) -> String {
    vars.iter().map(|var| format_variable(trace, var, dirty_marker)).join(", ")
}

/// Render a listing as `a = 1, ##b = true`
pub fn variables_string(trace: &DebugTrace, vars: &[VariableData]) -> String {
    format_variables(trace, vars, DIRTY_MARKER)
}

/// Render the locals of `frame`, or of the innermost frame when `None`
pub fn local_variables_string(
    trace: &DebugTrace,
    player: &TracePlayer,
    frame: Option<usize>,
) -> Result<String, PlayerError> {
    let frame = match frame {
        Some(frame) => frame,
        None => player
            .stack_depth()
            .checked_sub(1)
            .ok_or(PlayerError::FrameOutOfRange { index: 0, depth: 0 })?,
    };
    Ok(variables_string(trace, &player.local_variables(frame)?))
}

/// Render the global listing
pub fn global_variables_string(trace: &DebugTrace, player: &TracePlayer) -> String {
    variables_string(trace, &player.global_variables())
}
