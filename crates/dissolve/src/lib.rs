//! The Driver (`spec.md` §4.5): orchestrates file discovery, invokes the
//! Source Model, Marker Collector, Type Resolver, and Call-site Rewriter
//! per file, aggregates counts, renders diffs, and chooses exit codes.

pub mod args;
mod commands;
mod discover;
mod logging;
mod module_name;
mod pipeline;
mod printer;
mod version;

use std::process::ExitCode;

use anyhow::Result;

use args::{Args, Command};

/// The Driver's exit-code contract (`spec.md` §6: "0 success/no-op; 1
/// changes detected in --check mode, or any file failed; 2 invalid
/// arguments").
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    ChangesFoundOrFailed,
    InvalidArguments,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::ChangesFoundOrFailed => ExitCode::from(1),
            ExitStatus::InvalidArguments => ExitCode::from(2),
        }
    }
}

/// Install a panic hook that prints a short, non-backtrace-spamming
/// message before the default hook runs, the way the teacher's `ruff::run`
/// wraps `std::panic::take_hook` for its own CLI entry point.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("dissolve crashed unexpectedly; this is a bug.");
        default_hook(info);
    }));
}

pub fn run(args: Args) -> Result<ExitStatus> {
    install_panic_hook();
    logging::init(&args.globals);

    match args.command {
        Command::Migrate(cmd) => commands::migrate::run(&cmd, &args.globals),
        Command::Cleanup(cmd) => commands::cleanup::run(&cmd, &args.globals),
        Command::Check(cmd) => commands::check::run(&cmd, &args.globals),
        Command::Info(cmd) => commands::info::run(&cmd, &args.globals),
    }
}
