//! Interactive REPL simulation debugger.
//!
//! Provides [`InteractiveSim`] which wraps a [`SimKernel`] with a
//! command-driven interface for stepping through simulations, inspecting
//! signal values, setting breakpoints, and watching signals.
//!
//! # Usage
//!
//! ```ignore
//! use aion_sim::interactive::InteractiveSim;
//!
//! let mut isim = InteractiveSim::new(&design, &interner)?;
//! isim.initialize()?;
//! isim.run_repl(&mut std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use aion_common::Interner;
use aion_ir::Design;

use crate::error::SimError;
use crate::kernel::{SimKernel, StepResult};
use crate::time::{FS_PER_MS, FS_PER_NS, FS_PER_PS, FS_PER_US};

/// Femtoseconds per second.
const FS_PER_S: u64 = FS_PER_MS * 1_000;

/// A simulation command parsed from user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimCommand {
    /// Run for a specified duration in femtoseconds.
    Run {
        /// Duration to run in femtoseconds.
        duration_fs: u64,
    },
    /// Execute a single delta cycle step.
    Step,
    /// Inspect one or more signal values.
    Inspect {
        /// Signal name patterns to inspect.
        signals: Vec<String>,
    },
    /// Set a time breakpoint.
    BreakpointTime {
        /// Breakpoint time in femtoseconds.
        time_fs: u64,
    },
    /// Add a signal to the watch list.
    Watch {
        /// Signal name to watch.
        signal: String,
    },
    /// Remove a signal from the watch list.
    Unwatch {
        /// Signal name to remove.
        signal: String,
    },
    /// Continue execution until next breakpoint or completion.
    Continue,
    /// Display current simulation time.
    Time,
    /// List all signals.
    Signals,
    /// Show simulation status.
    Status,
    /// Display help text.
    Help,
    /// Quit the interactive session.
    Quit,
}

/// A time breakpoint in the simulation.
#[derive(Clone, Debug)]
struct Breakpoint {
    /// Unique breakpoint ID.
    id: u32,
    /// Time in femtoseconds to break at.
    time_fs: u64,
}

/// An entry in the signal watch list.
#[derive(Clone, Debug)]
struct WatchEntry {
    /// Signal name pattern.
    name: String,
}

/// Result of executing a simulation command.
#[derive(Clone, Debug)]
pub enum CommandResult {
    /// Command produced text output.
    Output(String),
    /// Simulation should quit.
    Quit,
    /// Simulation hit a breakpoint.
    BreakpointHit {
        /// The breakpoint ID.
        bp_id: u32,
    },
    /// Simulation finished ($finish or no events).
    Finished,
}

/// Interactive simulation wrapper providing REPL-style debugging.
///
/// Wraps a [`SimKernel`] with breakpoints, watches, command history,
/// and a text-based interface for stepping through simulations.
pub struct InteractiveSim {
    kernel: SimKernel,
    breakpoints: Vec<Breakpoint>,
    next_bp_id: u32,
    watches: Vec<WatchEntry>,
    history: Vec<String>,
    initialized: bool,
}

impl InteractiveSim {
    /// Creates a new interactive simulation from an elaborated design.
    ///
    /// The `interner` is used to resolve interned signal names.
    pub fn new(design: &Design, interner: &Interner) -> Result<Self, SimError> {
        let kernel = SimKernel::new(design, interner)?;
        Ok(Self {
            kernel,
            breakpoints: Vec::new(),
            next_bp_id: 1,
            watches: Vec::new(),
            history: Vec::new(),
            initialized: false,
        })
    }

    /// Initializes the simulation by running initial and combinational processes.
    ///
    /// Must be called exactly once before executing any simulation commands.
    pub fn initialize(&mut self) -> Result<(), SimError> {
        if self.initialized {
            return Ok(());
        }
        self.kernel.initialize()?;
        self.initialized = true;
        Ok(())
    }

    /// Executes a single simulation command and returns the result.
    pub fn execute(&mut self, cmd: &SimCommand) -> Result<CommandResult, SimError> {
        match cmd {
            SimCommand::Run { duration_fs } => self.cmd_run(*duration_fs),
            SimCommand::Step => self.cmd_step(),
            SimCommand::Inspect { signals } => self.cmd_inspect(signals),
            SimCommand::BreakpointTime { time_fs } => self.cmd_breakpoint_time(*time_fs),
            SimCommand::Watch { signal } => self.cmd_watch(signal),
            SimCommand::Unwatch { signal } => self.cmd_unwatch(signal),
            SimCommand::Continue => self.cmd_continue(),
            SimCommand::Time => self.cmd_time(),
            SimCommand::Signals => self.cmd_signals(),
            SimCommand::Status => self.cmd_status(),
            SimCommand::Help => Ok(CommandResult::Output(help_text())),
            SimCommand::Quit => Ok(CommandResult::Quit),
        }
    }

    /// Runs the REPL loop, reading commands from `input` and writing to `output`.
    pub fn run_repl<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), SimError> {
        if !self.initialized {
            self.initialize()?;
        }

        // Print initial display output
        let initial_output = self.kernel.take_display_output();
        for line in &initial_output {
            let _ = writeln!(output, "{line}");
        }

        writeln!(output, "Aion Interactive Simulator")?;
        writeln!(output, "Type 'help' for available commands.")?;
        writeln!(
            output,
            "Simulation initialized at {}",
            self.kernel.current_time()
        )?;
        writeln!(output)?;

        let mut line = String::new();
        loop {
            write!(output, "aion> ")?;
            output.flush()?;

            line.clear();
            let bytes_read = input.read_line(&mut line)?;
            if bytes_read == 0 {
                // EOF
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            self.history.push(trimmed.to_string());

            match parse_command(trimmed) {
                Ok(cmd) => match self.execute(&cmd)? {
                    CommandResult::Output(text) => {
                        writeln!(output, "{text}")?;
                        // Print any display output generated
                        for msg in self.kernel.take_display_output() {
                            writeln!(output, "[display] {msg}")?;
                        }
                        // Print watched signals
                        self.print_watches(output)?;
                    }
                    CommandResult::Quit => {
                        writeln!(output, "Goodbye.")?;
                        break;
                    }
                    CommandResult::BreakpointHit { bp_id } => {
                        writeln!(
                            output,
                            "Breakpoint #{bp_id} hit at {}",
                            self.kernel.current_time()
                        )?;
                        self.print_watches(output)?;
                    }
                    CommandResult::Finished => {
                        writeln!(
                            output,
                            "Simulation finished at {}",
                            self.kernel.current_time()
                        )?;
                        for msg in self.kernel.take_display_output() {
                            writeln!(output, "[display] {msg}")?;
                        }
                        for fail in self.kernel.take_assertion_failures() {
                            writeln!(output, "[FAIL] {fail}")?;
                        }
                    }
                },
                Err(err) => {
                    writeln!(output, "Error: {err}")?;
                }
            }
        }

        Ok(())
    }

    /// Prints watched signal values.
    fn print_watches<W: Write>(&self, output: &mut W) -> Result<(), SimError> {
        if self.watches.is_empty() {
            return Ok(());
        }
        for watch in &self.watches {
            if let Some(id) = self.kernel.find_signal(&watch.name) {
                let val = self.kernel.signal_value(id);
                writeln!(output, "  [watch] {} = {}", watch.name, format_value(val))?;
            }
        }
        Ok(())
    }

    fn cmd_run(&mut self, duration_fs: u64) -> Result<CommandResult, SimError> {
        let target_fs = self.kernel.current_time().fs + duration_fs;

        loop {
            if self.kernel.is_finished() || !self.kernel.has_pending_events() {
                return Ok(CommandResult::Finished);
            }

            // Check breakpoints before stepping
            if let Some(bp) = self.check_breakpoints(target_fs) {
                return Ok(CommandResult::BreakpointHit { bp_id: bp });
            }

            if self.kernel.current_time().fs >= target_fs {
                break;
            }

            let result = self.kernel.step_delta()?;
            if result == StepResult::Done {
                return Ok(CommandResult::Finished);
            }
        }

        Ok(CommandResult::Output(format!(
            "Ran to {}",
            self.kernel.current_time()
        )))
    }

    fn cmd_step(&mut self) -> Result<CommandResult, SimError> {
        let result = self.kernel.step_delta()?;
        match result {
            StepResult::Continued => Ok(CommandResult::Output(format!(
                "Stepped to {}",
                self.kernel.current_time()
            ))),
            StepResult::Done => Ok(CommandResult::Finished),
        }
    }

    fn cmd_inspect(&self, signals: &[String]) -> Result<CommandResult, SimError> {
        let mut output = String::new();
        for name in signals {
            match self.kernel.find_signal(name) {
                Some(id) => {
                    let val = self.kernel.signal_value(id);
                    output.push_str(&format!("{name} = {}\n", format_value(val)));
                }
                None => {
                    // Try partial match
                    let all = self.kernel.all_signals();
                    let matches: Vec<_> = all
                        .iter()
                        .filter(|(_, n, _)| n.contains(name.as_str()))
                        .collect();
                    if matches.is_empty() {
                        output.push_str(&format!("Signal not found: {name}\n"));
                    } else {
                        for (id, matched_name, _) in matches {
                            let val = self.kernel.signal_value(*id);
                            output.push_str(&format!("{matched_name} = {}\n", format_value(val)));
                        }
                    }
                }
            }
        }
        if output.ends_with('\n') {
            output.truncate(output.len() - 1);
        }
        Ok(CommandResult::Output(output))
    }

    fn cmd_breakpoint_time(&mut self, time_fs: u64) -> Result<CommandResult, SimError> {
        let id = self.next_bp_id;
        self.next_bp_id += 1;
        self.breakpoints.push(Breakpoint { id, time_fs });
        Ok(CommandResult::Output(format!(
            "Breakpoint #{id} set at {}",
            format_time_fs(time_fs)
        )))
    }

    fn cmd_watch(&mut self, signal: &str) -> Result<CommandResult, SimError> {
        if self.kernel.find_signal(signal).is_none() {
            return Ok(CommandResult::Output(format!(
                "Warning: signal '{signal}' not found (will watch if it appears)"
            )));
        }
        self.watches.push(WatchEntry {
            name: signal.to_string(),
        });
        Ok(CommandResult::Output(format!("Watching '{signal}'")))
    }

    fn cmd_unwatch(&mut self, signal: &str) -> Result<CommandResult, SimError> {
        let before = self.watches.len();
        self.watches.retain(|w| w.name != signal);
        if self.watches.len() < before {
            Ok(CommandResult::Output(format!("Unwatched '{signal}'")))
        } else {
            Ok(CommandResult::Output(format!(
                "Signal '{signal}' was not being watched"
            )))
        }
    }

    fn cmd_continue(&mut self) -> Result<CommandResult, SimError> {
        loop {
            if self.kernel.is_finished() || !self.kernel.has_pending_events() {
                return Ok(CommandResult::Finished);
            }

            if let Some(bp) = self.check_breakpoints(u64::MAX) {
                return Ok(CommandResult::BreakpointHit { bp_id: bp });
            }

            let result = self.kernel.step_delta()?;
            if result == StepResult::Done {
                return Ok(CommandResult::Finished);
            }
        }
    }

    fn cmd_time(&self) -> Result<CommandResult, SimError> {
        Ok(CommandResult::Output(format!(
            "Current time: {}",
            self.kernel.current_time()
        )))
    }

    fn cmd_signals(&self) -> Result<CommandResult, SimError> {
        let signals = self.kernel.all_signals();
        if signals.is_empty() {
            return Ok(CommandResult::Output("No signals".to_string()));
        }
        let mut output = String::new();
        output.push_str(&format!("{} signal(s):\n", signals.len()));
        for (_, name, width) in &signals {
            output.push_str(&format!("  {name} [{width} bit]\n"));
        }
        if output.ends_with('\n') {
            output.truncate(output.len() - 1);
        }
        Ok(CommandResult::Output(output))
    }

    fn cmd_status(&self) -> Result<CommandResult, SimError> {
        let mut output = String::new();
        output.push_str(&format!("Time: {}\n", self.kernel.current_time()));
        output.push_str(&format!("Signals: {}\n", self.kernel.signal_count()));
        output.push_str(&format!("Processes: {}\n", self.kernel.process_count()));
        output.push_str(&format!(
            "Pending events: {}\n",
            if self.kernel.has_pending_events() {
                "yes"
            } else {
                "no"
            }
        ));
        output.push_str(&format!(
            "Finished: {}\n",
            if self.kernel.is_finished() {
                "yes"
            } else {
                "no"
            }
        ));
        output.push_str(&format!("Breakpoints: {}\n", self.breakpoints.len()));
        output.push_str(&format!("Watches: {}", self.watches.len()));
        Ok(CommandResult::Output(output))
    }

    /// Checks if any breakpoint is at or before the current time.
    fn check_breakpoints(&self, _target_fs: u64) -> Option<u32> {
        let current_fs = self.kernel.current_time().fs;
        for bp in &self.breakpoints {
            if bp.time_fs <= current_fs {
                return Some(bp.id);
            }
        }
        None
    }
}

/// Parses a command string into a `SimCommand`.
///
/// Supports both full command names and single-character shortcuts:
/// `r`=run, `s`=step, `i`=inspect, `c`=continue, `t`=time,
/// `q`=quit, `h`=help, `bp`=breakpoint, `w`=watch, `sig`=signals.
pub fn parse_command(input: &str) -> Result<SimCommand, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty command".to_string());
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let cmd = parts[0].to_lowercase();
    let args = &parts[1..];

    match cmd.as_str() {
        "run" | "r" => {
            if args.is_empty() {
                return Err("run requires a duration (e.g., 'run 100ns')".to_string());
            }
            let duration_fs =
                parse_sim_duration(args[0]).map_err(|e| format!("invalid duration: {e}"))?;
            Ok(SimCommand::Run { duration_fs })
        }
        "step" | "s" => Ok(SimCommand::Step),
        "inspect" | "i" => {
            if args.is_empty() {
                return Err("inspect requires signal name(s)".to_string());
            }
            Ok(SimCommand::Inspect {
                signals: args.iter().map(|s| s.to_string()).collect(),
            })
        }
        "breakpoint" | "bp" => {
            if args.is_empty() {
                return Err(
                    "breakpoint requires a time (e.g., 'bp @100ns' or 'bp 100ns')".to_string(),
                );
            }
            let time_str = args[0].strip_prefix('@').unwrap_or(args[0]);
            let time_fs = parse_sim_duration(time_str)
                .map_err(|e| format!("invalid breakpoint time: {e}"))?;
            Ok(SimCommand::BreakpointTime { time_fs })
        }
        "watch" | "w" => {
            if args.is_empty() {
                return Err("watch requires a signal name".to_string());
            }
            Ok(SimCommand::Watch {
                signal: args[0].to_string(),
            })
        }
        "unwatch" => {
            if args.is_empty() {
                return Err("unwatch requires a signal name".to_string());
            }
            Ok(SimCommand::Unwatch {
                signal: args[0].to_string(),
            })
        }
        "continue" | "c" => Ok(SimCommand::Continue),
        "time" | "t" => Ok(SimCommand::Time),
        "signals" | "sig" => Ok(SimCommand::Signals),
        "status" => Ok(SimCommand::Status),
        "help" | "h" => Ok(SimCommand::Help),
        "quit" | "q" => Ok(SimCommand::Quit),
        _ => Err(format!("unknown command: '{}'", parts[0])),
    }
}

/// Parses a duration string into femtoseconds.
///
/// Supports units: `fs`, `ps`, `ns`, `us`, `ms`, `s`.
/// Returns the duration value in femtoseconds.
pub fn parse_sim_duration(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(format!("no numeric value in '{s}'"));
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| format!("invalid number in '{s}'"))?;

    let unit = s[digit_end..].trim();
    let multiplier = match unit {
        "fs" => 1,
        "ps" => FS_PER_PS,
        "ns" => FS_PER_NS,
        "us" => FS_PER_US,
        "ms" => FS_PER_MS,
        "s" => FS_PER_S,
        "" => return Err(format!("missing unit in '{s}'")),
        _ => return Err(format!("unknown unit '{unit}'")),
    };

    Ok(number * multiplier)
}

/// Formats a `LogicVec` for display.
///
/// Single-bit values render as `0`, `1`, `x`, or `z`.
/// Multi-bit values without X/Z render as hex (e.g., `8'hff`).
/// Multi-bit values with X/Z render as binary (e.g., `4'bz0x1`).
pub fn format_value(val: &aion_common::LogicVec) -> String {
    use aion_common::Logic;
    let w = val.width();
    if w == 1 {
        match val.get(0) {
            Logic::Zero => "0".into(),
            Logic::One => "1".into(),
            Logic::X => "x".into(),
            Logic::Z => "z".into(),
        }
    } else {
        // Show hex if no X/Z, otherwise binary
        let has_xz = (0..w).any(|i| matches!(val.get(i), Logic::X | Logic::Z));
        if has_xz {
            let mut s = String::with_capacity(w as usize);
            for i in (0..w).rev() {
                s.push(match val.get(i) {
                    Logic::Zero => '0',
                    Logic::One => '1',
                    Logic::X => 'x',
                    Logic::Z => 'z',
                });
            }
            format!("{w}'b{s}")
        } else {
            match val.to_u64() {
                Some(v) => format!("{w}'h{v:x}"),
                None => format!("{w}'b..."),
            }
        }
    }
}

/// Formats a femtosecond timestamp for display.
fn format_time_fs(fs: u64) -> String {
    crate::time::SimTime::from_fs(fs).to_string()
}

/// Returns the help text for the interactive session.
fn help_text() -> String {
    "\
Commands:
  run <duration>     (r)   Run for duration (e.g., 'run 100ns')
  step               (s)   Execute one delta cycle
  inspect <signal>   (i)   Show signal value(s)
  breakpoint <time>  (bp)  Set time breakpoint (e.g., 'bp @100ns')
  watch <signal>     (w)   Add signal to watch list
  unwatch <signal>          Remove signal from watch list
  continue           (c)   Run until breakpoint or done
  time               (t)   Show current simulation time
  signals            (sig) List all signals
  status                   Show simulation status
  help               (h)   Show this help
  quit               (q)   Exit interactive mode

Duration units: fs, ps, ns, us, ms, s"
        .to_string()
}
