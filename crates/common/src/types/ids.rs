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

// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
// SPDX-License-Identifier: AGPL-3.0
//! Stable identifiers used by debug traces

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Index of a slot in [`DebugTrace::slots`](crate::types::DebugTrace::slots)
///
/// A slot is the storage for one scalar component of a source-level variable
/// or of a function result. Slot ids are stable for the lifetime of the trace.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
)]
#[serde(transparent)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Create a new slot id
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index of this slot
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a function in [`DebugTrace::functions`](crate::types::DebugTrace::functions)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
)]
#[serde(transparent)]
pub struct FunctionId(pub usize);

impl FunctionId {
    /// Create a new function id
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index of this function
    pub fn index(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&SlotId(7)).unwrap();
        assert_eq!(json, "7");

        let id: FunctionId = serde_json::from_str("3").unwrap();
        assert_eq!(id, FunctionId::new(3));
        assert_eq!(id.to_string(), "3");
    }
}
