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

//! Command modules for the TDB CLI

pub mod config;
pub mod demo;
pub mod inspect;
pub mod replay;

pub use config::show_config;
pub use demo::write_sample;
pub use inspect::{dump_trace, show_info};
pub use replay::replay_trace;

use eyre::{Context, Result};
use std::{fs::File, io::BufReader, path::Path};
use tdb_common::types::DebugTrace;

/// Read a JSON trace file
pub fn load_trace(path: &Path) -> Result<DebugTrace> {
    let file = File::open(path).with_context(|| format!("Failed to open trace file: {path:?}"))?;
    let trace = DebugTrace::read_from(BufReader::new(file))
        .with_context(|| format!("Failed to parse trace file: {path:?}"))?;

    tracing::debug!(events = trace.len(), "Loaded trace from {:?}", path);
    Ok(trace)
}
