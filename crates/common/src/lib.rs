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
//! TDB Common - Shared functionality for TDB components
//!
//! This crate holds the debug trace data model consumed by the trace player,
//! and the logging setup shared by the TDB binaries and tests.

/// Debug trace data model: functions, slots, events and display helpers
pub mod types;

/// Errors reported while reading or checking a trace
pub mod error;
/// Sample traces used by tests and demos
pub mod samples;
/// Logging setup and utilities for consistent logging across TDB components
pub mod logging;

pub use error::*;
