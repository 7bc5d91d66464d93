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

//! Errors reported by the debug trace data model

use thiserror::Error;

use crate::types::{FunctionId, SlotId};

/// Errors that can occur while reading or checking a debug trace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// A slot id does not exist in the trace
    #[error("unknown slot {slot} (trace has {count} slots)")]
    UnknownSlot {
        /// The offending slot id
        slot: SlotId,
        /// Number of slots in the trace
        count: usize,
    },

    /// A function id does not exist in the trace
    #[error("unknown function {function} (trace has {count} functions)")]
    UnknownFunction {
        /// The offending function id
        function: FunctionId,
        /// Number of functions in the trace
        count: usize,
    },

    /// The event log breaks the nesting or write-before-use rules
    #[error("malformed trace at event {position}: {reason}")]
    Malformed {
        /// Index of the first offending event
        position: usize,
        /// What went wrong
        reason: String,
    },
}

impl TraceError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed { position, reason: reason.into() }
    }
}
