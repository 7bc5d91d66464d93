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

//! TDB Engine - replay of recorded VM traces
//!
//! [`TracePlayer`] walks a [`DebugTrace`](tdb_common::types::DebugTrace) one
//! statement at a time and answers questions about the call stack and the
//! variables in scope at every step. [`display`] renders those answers as text.

pub mod display;

pub mod error;
pub use error::*;

pub mod player;
pub use player::*;
