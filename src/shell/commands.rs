//! Command handlers

use core::fmt::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::parser::CommandLine;
use super::ShellError;
use crate::output::TermOut;
use crate::power::SleepController;

/// Longest sleep cycle `sleep` accepts, in milliseconds.
pub const MAX_SLEEP_MS: u64 = 60_000;

/// What the commands operate on.
pub struct ShellContext {
    pub out: Arc<TermOut>,
    pub sleep: Arc<SleepController>,
}

type Handler = fn(&CommandLine<'_>, &ShellContext, &mut dyn Write) -> Result<(), ShellError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "stats", brief: "Output counters", handler: cmd_stats },
    CommandDescriptor { name: "version", brief: "Firmware version", handler: cmd_version },
    CommandDescriptor { name: "sleep", brief: "Suspend/resume cycle [ms]", handler: cmd_sleep },
    CommandDescriptor { name: "off", brief: "Disable console output", handler: cmd_off },
];

/// Execute a parsed command
pub fn execute(
    cmd: &CommandLine<'_>,
    ctx: &ShellContext,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    if cmd.is_empty() {
        return Ok(()); // Empty line, do nothing
    }

    let handler = COMMANDS
        .iter()
        .find(|c| c.name == cmd.name())
        .ok_or(ShellError::UnknownCommand)?;

    (handler.handler)(cmd, ctx, out)
}

// --- Command Implementations ---

fn cmd_help(cmd: &CommandLine<'_>, _ctx: &ShellContext, out: &mut dyn Write) -> Result<(), ShellError> {
    if let Some(name) = cmd.arg(0) {
        let c = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or(ShellError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.name, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(out, "  {:<8} {}", c.name, c.brief);
        }
    }
    Ok(())
}

fn cmd_stats(_cmd: &CommandLine<'_>, ctx: &ShellContext, out: &mut dyn Write) -> Result<(), ShellError> {
    let _ = writeln!(out, "tout: {}", ctx.out.stats());
    Ok(())
}

fn cmd_version(_cmd: &CommandLine<'_>, _ctx: &ShellContext, out: &mut dyn Write) -> Result<(), ShellError> {
    let _ = writeln!(out, "{}", crate::VERSION);
    Ok(())
}

fn cmd_sleep(cmd: &CommandLine<'_>, ctx: &ShellContext, out: &mut dyn Write) -> Result<(), ShellError> {
    if ctx.sleep.is_empty() {
        return Err(ShellError::Unavailable);
    }

    let ms: u64 = match cmd.arg(0) {
        Some(v) => v.parse().map_err(|_| ShellError::InvalidValue)?,
        None => 1000,
    };
    if ms == 0 || ms > MAX_SLEEP_MS {
        return Err(ShellError::OutOfRange);
    }

    let _ = writeln!(out, "sleep {} ms", ms);

    // Runs outside the editor task: it has to park the editor itself.
    let sleep = Arc::clone(&ctx.sleep);
    thread::Builder::new()
        .name("SLEEP".into())
        .spawn(move || {
            sleep.suspend_all();
            thread::sleep(Duration::from_millis(ms));
            sleep.resume_all();
        })
        .map(|_| ())
        .map_err(|_| ShellError::Unavailable)
}

fn cmd_off(_cmd: &CommandLine<'_>, ctx: &ShellContext, out: &mut dyn Write) -> Result<(), ShellError> {
    let _ = writeln!(out, "output off");
    ctx.out.disable();
    Ok(())
}
