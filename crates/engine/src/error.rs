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

//! Errors reported to callers of the trace player

use tdb_common::TraceError;
use thiserror::Error;

/// Misuse of the player by its caller.
///
/// Malformed traces are not reported here: the player trusts its producer and
/// panics on them. Use [`DebugTrace::validate`](tdb_common::types::DebugTrace::validate)
/// for traces of unknown origin.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// A stepping operation was called before any trace was loaded
    #[error("no trace loaded, call reset() first")]
    NotReset,

    /// A stack frame index outside `0..stack_depth()`
    #[error("stack frame {index} does not exist (stack depth is {depth})")]
    FrameOutOfRange {
        /// The requested frame
        index: usize,
        /// The current stack depth
        depth: usize,
    },

    /// A trace lookup failed
    #[error(transparent)]
    Trace(#[from] TraceError),
}
