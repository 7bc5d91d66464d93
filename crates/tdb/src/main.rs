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

//! TDB - Trace Debugger
//!
//! A step-by-step replay debugger for recorded VM traces.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing::Level;

mod cmd;
mod config;

use config::Config;

/// Command-line interface for TDB
#[derive(Debug, Parser)]
#[command(name = "tdb")]
#[command(about = "Trace Debugger - A step-by-step replay debugger for recorded VM traces")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ~/.tdb.toml)
    #[arg(long, global = true, env = "TDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a trace interactively
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,
        /// Set a breakpoint on a line (repeatable)
        #[arg(short, long = "break", value_name = "LINE")]
        breakpoints: Vec<i32>,
        /// Run `;`-separated commands instead of reading stdin
        #[arg(long)]
        script: Option<String>,
    },
    /// Print the functions, slots and events of a trace
    Dump {
        /// Trace file (JSON)
        trace: PathBuf,
    },
    /// Print trace statistics and validation status
    Info {
        /// Trace file (JSON)
        trace: PathBuf,
    },
    /// Write a bundled sample trace as JSON
    Demo {
        /// Sample name
        name: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the configuration, or create the file with defaults
    Config {
        /// Write the default configuration if the file does not exist
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _guard = tdb_common::logging::init_logging("tdb", level, config.logging.file_logging)?;
    tracing::info!("Using configuration file: {:?}", config_path);

    match cli.command {
        Commands::Replay { trace, breakpoints, script } => {
            tracing::info!("Replaying trace: {:?}", trace);
            cmd::replay_trace(&trace, &breakpoints, script.as_deref(), &config)
        }
        Commands::Dump { trace } => cmd::dump_trace(&trace),
        Commands::Info { trace } => cmd::show_info(&trace),
        Commands::Demo { name, output } => cmd::write_sample(&name, output.as_deref()),
        Commands::Config { init } => cmd::show_config(&config_path, &config, init),
    }
}
