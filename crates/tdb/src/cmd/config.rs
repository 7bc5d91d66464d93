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

//! Config command

use eyre::Result;
use std::path::Path;

use crate::config::Config;

/// Print the effective configuration, or write the defaults with `init`
pub fn show_config(path: &Path, config: &Config, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            println!("Configuration file already exists: {}", path.display());
        } else {
            Config::default().save_to(path)?;
            println!("Created configuration file: {}", path.display());
        }
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
