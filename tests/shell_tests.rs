//! Command shell tests

use std::sync::Arc;

use rust_term_io::shell::{execute, CommandLine, ShellError, COMMANDS};
use rust_term_io::{OutputConfig, Rejection, ShellContext, SleepController, TermOut, VERSION};

fn context() -> ShellContext {
    ShellContext {
        out: Arc::new(TermOut::new(&OutputConfig::default()).unwrap()),
        sleep: Arc::new(SleepController::new()),
    }
}

fn run(ctx: &ShellContext, line: &str) -> (Result<(), ShellError>, String) {
    let mut output = String::new();
    let result = execute(&CommandLine::parse(line), ctx, &mut output);
    (result, output)
}

#[test]
fn test_command_registry_has_all_commands() {
    let expected = ["help", "stats", "version", "sleep", "off"];

    for name in expected {
        assert!(
            COMMANDS.iter().any(|c| c.name == name),
            "Command '{}' should be in registry",
            name
        );
    }
}

#[test]
fn test_execute_unknown_command() {
    let (result, _) = run(&context(), "foobar");
    assert_eq!(result, Err(ShellError::UnknownCommand));
}

#[test]
fn test_empty_line_is_noop() {
    let (result, output) = run(&context(), "   ");
    assert!(result.is_ok());
    assert!(output.is_empty());
}

#[test]
fn test_execute_help() {
    let ctx = context();
    let (result, output) = run(&ctx, "help");
    assert!(result.is_ok());
    for c in COMMANDS {
        assert!(output.contains(c.name));
    }

    let (result, output) = run(&ctx, "help stats");
    assert!(result.is_ok());
    assert_eq!(output, "stats: Output counters\n");
}

#[test]
fn test_stats_reports_counters() {
    let ctx = context();
    ctx.out.add_str("one\n").unwrap();

    let (_, output) = run(&ctx, "stats");
    assert_eq!(output, "tout: mprn=0 mign=0 qfull=0 serr=0 prnerr=0\n");
}

#[test]
fn test_version_prints_build_string() {
    let (_, output) = run(&context(), "version");
    assert_eq!(output.trim_end(), VERSION);
    assert!(VERSION.starts_with("RustTermIO v"));
}

#[test]
fn test_sleep_without_hooks_unavailable() {
    let (result, _) = run(&context(), "sleep 100");
    assert_eq!(result, Err(ShellError::Unavailable));
    assert_eq!(ShellError::Unavailable.to_string(), "E04: not available");
}

#[test]
fn test_off_disables_output() {
    let ctx = context();
    let (result, output) = run(&ctx, "off");
    assert!(result.is_ok());
    assert_eq!(output, "output off\n");
    assert_eq!(ctx.out.add_str("x\n"), Err(Rejection::Disabled));
}

#[test]
fn test_handle_line_prints_errors_through_pipeline() {
    let ctx = context();
    ctx.handle_line("bogus");

    assert_eq!(ctx.out.queue().len(), 1);
}

struct Idle;

impl rust_term_io::power::SleepHook for Idle {
    fn suspend(&self) {}
    fn resume(&self) {}
}

#[test]
fn test_sleep_argument_checked() {
    let ctx = context();
    ctx.sleep
        .register(rust_term_io::SleepPriority::SuspendLast, Arc::new(Idle));

    assert_eq!(run(&ctx, "sleep soon").0, Err(ShellError::InvalidValue));
    assert_eq!(run(&ctx, "sleep 0").0, Err(ShellError::OutOfRange));
    assert_eq!(run(&ctx, "sleep 60001").0, Err(ShellError::OutOfRange));

    let (result, output) = run(&ctx, "sleep 10");
    assert!(result.is_ok());
    assert_eq!(output, "sleep 10 ms\n");
}
