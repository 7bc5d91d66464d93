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

//! Demo command - export the bundled sample traces

use eyre::{bail, Context, Result};
use std::{fs, path::Path};
use tdb_common::samples;

/// Write the sample trace `name` as JSON to `output`, or to stdout
pub fn write_sample(name: &str, output: Option<&Path>) -> Result<()> {
    let Some(trace) = samples::by_name(name) else {
        bail!("Unknown sample '{}' (available: {})", name, samples::SAMPLE_NAMES.join(", "));
    };
    let json = trace.to_json_string().wrap_err("Failed to serialize sample trace")?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {path:?}"))?;
            tracing::info!("Wrote sample '{}' to {:?}", name, path);
        }
        None => println!("{json}"),
    }
    Ok(())
}
