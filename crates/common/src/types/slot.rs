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

//! Static metadata describing functions and slots of a debug trace

use serde::{Deserialize, Serialize};

use crate::types::FunctionId;

/// Describes one function that can appear in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Display name including signature, e.g. `int main()`
    pub name: String,
    /// Number of slots holding the function's result (0 for `void`)
    #[serde(default)]
    pub return_slot_count: usize,
}

impl FunctionInfo {
    /// Create a new function descriptor
    pub fn new(name: impl Into<String>, return_slot_count: usize) -> Self {
        Self { name: name.into(), return_slot_count }
    }

    /// The bare function name, without return type and parameter list.
    ///
    /// `float4 blend(float4 a, float4 b)` becomes `blend`.
    pub fn short_name(&self) -> &str {
        let head = self.name.split('(').next().unwrap_or_default().trim_end();
        head.rsplit(char::is_whitespace).next().unwrap_or(head)
    }
}

/// Position of a slot inside a multi-component variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentLayout {
    /// A plain scalar variable
    #[default]
    Scalar,
    /// One component of a vector
    Vector {
        /// Component index (0 = x, 1 = y, ...)
        index: u8,
    },
    /// One component of a matrix
    Matrix {
        /// Row of the component
        row: u8,
        /// Column of the component
        col: u8,
    },
}

impl ComponentLayout {
    /// Display suffix appended to the variable name
    pub fn suffix(&self) -> String {
        match *self {
            Self::Scalar => String::new(),
            Self::Vector { index } => match index {
                0 => ".x".to_string(),
                1 => ".y".to_string(),
                2 => ".z".to_string(),
                3 => ".w".to_string(),
                n => format!("[{n}]"),
            },
            Self::Matrix { row, col } => format!("[{row}][{col}]"),
        }
    }
}

/// How the raw 32 bits stored in a slot are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    /// Two's complement signed integer
    #[default]
    Signed,
    /// Unsigned integer
    Unsigned,
    /// IEEE-754 single precision float
    Float,
    /// Boolean, any non-zero value is `true`
    Boolean,
}

impl NumberKind {
    /// Render a raw slot value as text
    pub fn format_raw(&self, raw: i32) -> String {
        match self {
            Self::Signed => raw.to_string(),
            Self::Unsigned => (raw as u32).to_string(),
            // `Display` for f32 prints the shortest representation that round-trips.
            Self::Float => f32::from_bits(raw as u32).to_string(),
            Self::Boolean => (if raw != 0 { "true" } else { "false" }).to_string(),
        }
    }
}

/// Describes one slot of a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Name of the source variable this slot belongs to
    pub name: String,
    /// Position inside the variable group; 0 starts a new group
    #[serde(default)]
    pub group_index: usize,
    /// Component layout used for the display suffix
    #[serde(default)]
    pub layout: ComponentLayout,
    /// Interpretation of the raw value
    #[serde(default)]
    pub kind: NumberKind,
    /// Line where the variable is declared, -1 if unknown
    #[serde(default = "unknown_line")]
    pub line: i32,
    /// Set when this slot holds the result of the given function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionId>,
}

fn unknown_line() -> i32 {
    -1
}

impl SlotInfo {
    /// Create a scalar slot for a source variable
    pub fn scalar(name: impl Into<String>, kind: NumberKind, line: i32) -> Self {
        Self {
            name: name.into(),
            group_index: 0,
            layout: ComponentLayout::Scalar,
            kind,
            line,
            function_result: None,
        }
    }

    /// Whether this slot is a synthetic function-result pseudo-variable
    pub fn is_function_result(&self) -> bool {
        self.function_result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_strips_signature() {
        assert_eq!(FunctionInfo::new("int main()", 1).short_name(), "main");
        assert_eq!(FunctionInfo::new("float4 blend(float4 a, float4 b)", 4).short_name(), "blend");
        assert_eq!(FunctionInfo::new("helper", 0).short_name(), "helper");
    }

    #[test]
    fn test_component_suffixes() {
        assert_eq!(ComponentLayout::Scalar.suffix(), "");
        assert_eq!(ComponentLayout::Vector { index: 0 }.suffix(), ".x");
        assert_eq!(ComponentLayout::Vector { index: 3 }.suffix(), ".w");
        assert_eq!(ComponentLayout::Matrix { row: 2, col: 1 }.suffix(), "[2][1]");
    }

    #[test]
    fn test_format_raw_values() {
        assert_eq!(NumberKind::Signed.format_raw(-12), "-12");
        assert_eq!(NumberKind::Unsigned.format_raw(-1), "4294967295");
        assert_eq!(NumberKind::Boolean.format_raw(-1), "true");
        assert_eq!(NumberKind::Boolean.format_raw(0), "false");
        assert_eq!(NumberKind::Float.format_raw(0.5f32.to_bits() as i32), "0.5");
        assert_eq!(NumberKind::Float.format_raw(1.0f32.to_bits() as i32), "1");
        assert_eq!(NumberKind::Float.format_raw((-1.0f32).to_bits() as i32), "-1");
        assert_eq!(NumberKind::Float.format_raw(0.1f32.to_bits() as i32), "0.1");
    }
}
