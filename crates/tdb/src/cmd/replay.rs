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

//! Replay command - an interactive stepping session over a trace

use eyre::{bail, Result};
use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::Path,
    sync::Arc,
};
use tdb_common::types::DebugTrace;
use tdb_engine::{
    display::{format_variables, stack_string},
    TracePlayer,
};
use tracing::{debug, info};

use super::load_trace;
use crate::config::{Config, DisplayConfig};

/// Whether the session keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// End the session
    Quit,
}

/// Load a trace and replay it, reading commands from `script` or stdin
pub fn replay_trace(
    path: &Path,
    breakpoints: &[i32],
    script: Option<&str>,
    config: &Config,
) -> Result<()> {
    let trace = load_trace(path)?;
    if config.replay.auto_validate {
        if let Err(e) = trace.validate() {
            bail!("Refusing to replay malformed trace {:?}: {}", path, e);
        }
    }

    let mut session = Session::new(Arc::new(trace), config.display.clone());
    session.player.set_breakpoints(config.replay.breakpoints.iter().chain(breakpoints).copied());
    info!("Replay session started with {} breakpoint(s)", session.player().breakpoints().len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match script {
        Some(script) => {
            for command in script.split(';') {
                writeln!(out, "(tdb) {}", command.trim())?;
                if session.execute(command, &mut out)? == Flow::Quit {
                    break;
                }
            }
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            writeln!(out, "Type 'help' for available commands.")?;
            let mut lines = stdin.lock().lines();
            loop {
                if interactive {
                    write!(out, "(tdb) ")?;
                    out.flush()?;
                }
                let Some(line) = lines.next().transpose()? else { break };
                if session.execute(&line, &mut out)? == Flow::Quit {
                    break;
                }
            }
        }
    }

    info!("Replay session ended");
    Ok(())
}

/// A player bound to one trace, driven by text commands
pub struct Session {
    trace: Arc<DebugTrace>,
    player: TracePlayer,
    display: DisplayConfig,
}

impl Session {
    /// Start a session at the beginning of `trace`
    pub fn new(trace: Arc<DebugTrace>, display: DisplayConfig) -> Self {
        let player = TracePlayer::with_trace(trace.clone());
        Self { trace, player, display }
    }

    /// The underlying player
    pub fn player(&self) -> &TracePlayer {
        &self.player
    }

    /// Run one command line, writing its output to `out`
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { return Ok(Flow::Continue) };
        let argument = words.next();
        debug!(command, ?argument, "Executing replay command");

        match command {
            "step" | "s" => {
                self.player.step()?;
                self.show_location(out)?;
            }
            "next" | "n" => {
                self.player.step_over()?;
                self.show_location(out)?;
            }
            "out" | "o" => {
                self.player.step_out()?;
                self.show_location(out)?;
            }
            "run" | "r" | "continue" | "c" => {
                self.player.run()?;
                self.show_location(out)?;
            }
            "break" | "b" => match parse_line(argument) {
                Some(line) if self.player.add_breakpoint(line) => {
                    writeln!(out, "Breakpoint set at line {line}")?
                }
                Some(line) => writeln!(out, "Breakpoint already set at line {line}")?,
                None => writeln!(out, "Usage: break <line>")?,
            },
            "delete" | "d" => match parse_line(argument) {
                Some(line) if self.player.remove_breakpoint(line) => {
                    writeln!(out, "Breakpoint removed at line {line}")?
                }
                Some(line) => writeln!(out, "No breakpoint at line {line}")?,
                None => writeln!(out, "Usage: delete <line>")?,
            },
            "breakpoints" => self.show_breakpoints(out)?,
            "stack" | "bt" => self.show_stack(out)?,
            "locals" | "vars" => self.show_locals(argument, out)?,
            "globals" => writeln!(out, "globals: {}", self.render(&self.player.global_variables()))?,
            "line" | "where" => self.show_location(out)?,
            "reset" => {
                self.player.reset(self.trace.clone());
                writeln!(out, "Trace reset")?;
            }
            "help" | "h" => show_help(out)?,
            "quit" | "q" | "exit" => return Ok(Flow::Quit),
            other => {
                writeln!(out, "Unknown command: {other}. Type 'help' for available commands.")?
            }
        }
        Ok(Flow::Continue)
    }

    fn render(&self, vars: &[tdb_engine::VariableData]) -> String {
        format_variables(&self.trace, vars, &self.display.dirty_marker)
    }

    /// Where the player stands, with its innermost locals
    fn show_location(&self, out: &mut impl Write) -> Result<()> {
        if self.player.trace_has_completed() {
            writeln!(out, "Trace completed")?;
            writeln!(out, "globals: {}", self.render(&self.player.global_variables()))?;
            return Ok(());
        }

        let Some(frame) = self.player.stack_depth().checked_sub(1) else {
            writeln!(out, "Not started")?;
            return Ok(());
        };

        let line = self.player.current_line();
        writeln!(out, "line {line} in {}", stack_string(&self.trace, &self.player))?;
        if self.display.show_source {
            if let Some(text) = self.trace.source_line(line) {
                writeln!(out, "{line:>5} | {}", text.trim_end())?;
            }
        }
        writeln!(out, "locals: {}", self.render(&self.player.local_variables(frame)?))?;
        if self.display.show_globals {
            let globals = self.player.global_variables();
            if !globals.is_empty() {
                writeln!(out, "globals: {}", self.render(&globals))?;
            }
        }
        Ok(())
    }

    fn show_breakpoints(&self, out: &mut impl Write) -> Result<()> {
        let breakpoints = self.player.breakpoints();
        if breakpoints.is_empty() {
            writeln!(out, "No breakpoints")?;
        } else {
            let lines: Vec<String> = breakpoints.iter().map(i32::to_string).collect();
            writeln!(out, "Breakpoints: {}", lines.join(", "))?;
        }
        Ok(())
    }

    /// Frames innermost first, numbered by their index from the outermost
    fn show_stack(&self, out: &mut impl Write) -> Result<()> {
        let stack = self.player.call_stack();
        if stack.is_empty() {
            writeln!(out, "No active functions")?;
        }
        for (index, function) in stack.iter().enumerate().rev() {
            let name = self.trace.function(*function).map_or("???", |info| info.name.as_str());
            let line = self.player.current_line_in_frame(index)?;
            writeln!(out, "#{index} {name} at line {line}")?;
        }
        Ok(())
    }

    fn show_locals(&self, argument: Option<&str>, out: &mut impl Write) -> Result<()> {
        let frame = match argument {
            Some(text) => match text.parse::<usize>() {
                Ok(frame) => Some(frame),
                Err(_) => {
                    writeln!(out, "Usage: locals [frame]")?;
                    return Ok(());
                }
            },
            None => self.player.stack_depth().checked_sub(1),
        };
        let Some(frame) = frame else {
            writeln!(out, "No active functions")?;
            return Ok(());
        };

        match self.player.local_variables(frame) {
            Ok(vars) => writeln!(out, "locals: {}", self.render(&vars))?,
            Err(e) => writeln!(out, "Error: {e}")?,
        }
        Ok(())
    }
}

fn parse_line(argument: Option<&str>) -> Option<i32> {
    argument.and_then(|text| text.parse().ok())
}

fn show_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Available commands:")?;
    writeln!(out)?;
    writeln!(out, "Navigation:")?;
    writeln!(out, "  step, s              - Step to the next statement, entering calls")?;
    writeln!(out, "  next, n              - Step over calls in the current function")?;
    writeln!(out, "  out, o               - Run until the current function returns")?;
    writeln!(out, "  run, r, continue, c  - Run to the next breakpoint or the end")?;
    writeln!(out, "  reset                - Rewind to the start of the trace")?;
    writeln!(out)?;
    writeln!(out, "Breakpoints:")?;
    writeln!(out, "  break, b <line>      - Set a breakpoint")?;
    writeln!(out, "  delete, d <line>     - Remove a breakpoint")?;
    writeln!(out, "  breakpoints          - List breakpoints")?;
    writeln!(out)?;
    writeln!(out, "Inspection:")?;
    writeln!(out, "  stack, bt            - Show the call stack")?;
    writeln!(out, "  locals, vars [frame] - Show variables of a frame (default: innermost)")?;
    writeln!(out, "  globals              - Show global variables")?;
    writeln!(out, "  line, where          - Show the current location")?;
    writeln!(out)?;
    writeln!(out, "Other:")?;
    writeln!(out, "  help, h              - Show this help")?;
    writeln!(out, "  quit, q, exit        - Exit the debugger")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdb_common::samples;

    fn run(session: &mut Session, commands: &[&str]) -> String {
        let mut out = Vec::new();
        for command in commands {
            session.execute(command, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn session(trace: DebugTrace) -> Session {
        tdb_common::logging::ensure_test_logging(None);
        Session::new(Arc::new(trace), DisplayConfig::default())
    }

    #[test]
    fn test_step_prints_location_and_source() {
        let mut session = session(samples::hello_world());
        let output = run(&mut session, &["step"]);
        assert!(output.contains("line 3 in int main()"));
        assert!(output.contains("    3 |     return 2 + 2;  // Line 3"));
        assert!(output.contains("locals: \n"));

        let output = run(&mut session, &["s"]);
        assert!(output.contains("Trace completed"));
        assert!(output.contains("globals: ##[main].result = 4"));
    }

    #[test]
    fn test_breakpoint_commands() {
        let mut session = session(samples::for_loop());
        let output = run(&mut session, &["b 5", "break 5", "breakpoints", "c"]);
        assert!(output.contains("Breakpoint set at line 5"));
        assert!(output.contains("Breakpoint already set at line 5"));
        assert!(output.contains("Breakpoints: 5"));
        assert!(output.contains("locals: ##val = 0, ##x = 1"));

        let output = run(&mut session, &["d 5", "delete 5", "d x", "breakpoints"]);
        assert!(output.contains("Breakpoint removed at line 5"));
        assert!(output.contains("No breakpoint at line 5"));
        assert!(output.contains("Usage: delete <line>"));
        assert!(output.contains("No breakpoints"));
    }

    #[test]
    fn test_stack_and_frame_locals() {
        let mut session = session(samples::step_out());
        let output = run(&mut session, &["s", "s", "s", "bt", "locals 0", "locals 1", "locals 7"]);
        assert!(output.contains("#1 int fn() at line 4\n#0 int main() at line 10"));
        assert!(output.contains("locals: \n"));
        assert!(output.contains("locals: ##a = 11"));
        assert!(output.contains("Error: stack frame 7 does not exist (stack depth is 2)"));

        let output = run(&mut session, &["o"]);
        assert!(output.contains("line 10 in int main()"));
        assert!(output.contains("locals: ##[fn].result = 44"));
    }

    #[test]
    fn test_reset_quit_and_unknown_commands() {
        let mut session = session(samples::functions());
        let output = run(&mut session, &["where", "n", "reset", "line", "frobnicate"]);
        assert!(output.contains("Not started"));
        assert!(output.contains("Trace completed"));
        assert!(output.contains("Trace reset"));
        assert!(output.contains("Unknown command: frobnicate"));
        assert_eq!(session.player().cursor(), 0);

        let mut out = Vec::new();
        assert_eq!(session.execute("q", &mut out).unwrap(), Flow::Quit);
        assert_eq!(session.execute("   ", &mut out).unwrap(), Flow::Continue);
    }

    #[test]
    fn test_custom_dirty_marker() {
        tdb_common::logging::ensure_test_logging(None);
        let display = DisplayConfig { dirty_marker: "*".to_string(), ..Default::default() };
        let mut session = Session::new(Arc::new(samples::hello_world()), display);
        let output = run(&mut session, &["s", "s"]);
        assert!(output.contains("globals: *[main].result = 4"));
    }
}
