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

//! Dump and info commands

use eyre::Result;
use std::{io, path::Path};

use super::load_trace;

/// Print the full listing of a trace
pub fn dump_trace(path: &Path) -> Result<()> {
    let trace = load_trace(path)?;
    trace.dump(&mut io::stdout().lock())?;
    Ok(())
}

/// Print trace statistics and whether the trace is well formed
pub fn show_info(path: &Path) -> Result<()> {
    let trace = load_trace(path)?;
    let lines = trace.source().len().saturating_sub(1);

    println!("Trace: {}", path.display());
    println!("Functions: {}", trace.function_count());
    println!("Slots: {}", trace.slot_count());
    println!("Events: {}", trace.len());
    println!("Source lines: {lines}");
    match trace.validate() {
        Ok(()) => println!("Valid: yes"),
        Err(e) => {
            tracing::warn!("Trace {:?} is malformed: {}", path, e);
            println!("Valid: no ({e})");
        }
    }
    Ok(())
}
