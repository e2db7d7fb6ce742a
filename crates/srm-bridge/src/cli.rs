//! Clap derive structures for the `srm-bridge` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// srm-bridge -- mirror a Synology SRM router into a local state tree
#[derive(Debug, Parser)]
#[command(
    name = "srm-bridge",
    version,
    about = "Poll a Synology SRM router and mirror its state",
    long_about = "Logs in to a Synology SRM router, polls connection, device, mesh,\n\
        wifi, and traffic status, and mirrors it into a local state tree.\n\
        Wifi toggles written to the tree are pushed back to the router.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "SRM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Router IPv4 address (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// Router HTTPS port (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Router username (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Poll interval in seconds (minimum 60)
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain `path = value` lines (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge until interrupted
    Run(RunArgs),

    /// Connect, poll once, print the state tree, and log out
    #[command(alias = "snap")]
    Snapshot(SnapshotArgs),

    /// Validate configuration and print the effective settings
    Check,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Read `get`, `set`, and `dump` commands from stdin
    #[arg(long)]
    pub console: bool,

    /// Print state changes matching a pattern (e.g. `wifi.*`)
    #[arg(long, value_name = "PATTERN")]
    pub watch: Option<String>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Only print paths matching this pattern (`mesh.*`, exact path, or `*`)
    #[arg(default_value = "*")]
    pub pattern: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store the router password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
