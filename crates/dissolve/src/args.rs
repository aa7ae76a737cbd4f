use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Rewrite call sites of `replace_me`-marked functions, methods, classes,
/// and attributes, and remove their definitions once callers have moved on.
#[derive(Debug, Parser)]
#[command(name = "dissolve", about, version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[clap(flatten)]
    pub globals: GlobalArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite call sites of deprecated constructs to use their replacement.
    Migrate(MigrateArgs),
    /// Delete the definitions of constructs whose deprecation window has elapsed.
    Cleanup(CleanupArgs),
    /// Report which files `migrate`/`cleanup` would change, without writing.
    Check(CheckArgs),
    /// List deprecated constructs found under the given paths.
    Info(InfoArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity (may be repeated: `-v`, `-vv`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (may be repeated: `-q`, `-qq`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Set the logging verbosity explicitly, overriding `-v`/`-q`.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Number of files to process concurrently (default: number of CPUs).
    #[arg(long, global = true)]
    pub jobs: Option<usize>,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,

    /// How many hops of transitive imports the Collector follows looking
    /// for deprecated constructs (default: 2).
    #[arg(long, global = true)]
    pub import_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeMethod {
    Pyright,
    Mypy,
    None,
}

#[derive(Debug, clap::Args)]
pub struct MigrateArgs {
    /// Files or directories to migrate.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Overwrite the source file; default is to print the diff to stdout.
    #[arg(short, long)]
    pub write: bool,

    /// Report which files would change; exit 0 if none, 1 if any.
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Prompt before applying each replacement.
    #[arg(long)]
    pub interactive: bool,

    /// Which Type Resolver backend to use for receiver-typed method calls.
    #[arg(long, value_enum, default_value_t = TypeMethod::None)]
    pub type_method: TypeMethod,

    /// Per-query Type Resolver deadline, in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Debug, clap::Args)]
pub struct CleanupArgs {
    /// Files or directories to clean up.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Overwrite the source file; default is to print the rewritten text to stdout.
    #[arg(short, long)]
    pub write: bool,

    /// Report which files would change; exit 0 if none, 1 if any.
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Remove every deprecated construct, regardless of version.
    #[arg(long, conflicts_with_all = ["before", "current_version"])]
    pub all: bool,

    /// Remove constructs whose `since` predates `VERSION`.
    #[arg(long, value_name = "VERSION")]
    pub before: Option<String>,

    /// Remove constructs whose `remove_in` is at or before `VERSION`.
    #[arg(long, value_name = "VERSION")]
    pub current_version: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Files or directories to check.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Which Type Resolver backend to use for receiver-typed method calls.
    #[arg(long, value_enum, default_value_t = TypeMethod::None)]
    pub type_method: TypeMethod,

    /// Per-query Type Resolver deadline, in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Debug, clap::Args)]
pub struct InfoArgs {
    /// Files or directories to inspect.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}
