use tracing_subscriber::EnvFilter;

use crate::args::{GlobalArgs, LogLevel};

/// Resolve the effective log level from `--log-level`, or the `-v`/`-q`
/// counts otherwise, defaulting to `warn` (ordinary progress is `debug!`,
/// so it stays quiet unless asked for).
fn resolve_level(globals: &GlobalArgs) -> &'static str {
    if let Some(level) = globals.log_level {
        return match level {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
    }
    let verbosity = i64::from(globals.verbose) - i64::from(globals.quiet);
    match verbosity {
        ..=-2 => "error",
        -1 => "warn",
        0 => "warn",
        1 => "info",
        2 => "debug",
        3.. => "trace",
    }
}

/// Install the global `tracing` subscriber for the run, the way
/// `ruff_linter::logging::set_up_logging` installs `env_logger` for the
/// teacher's CLI, but built on `tracing-subscriber`'s `EnvFilter` so
/// `RUST_LOG` still overrides the CLI-derived default.
pub fn init(globals: &GlobalArgs) {
    let default_directive = resolve_level(globals);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
