//! CLI argument definitions for the `wincache` tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "wincache",
    version,
    about = "Explore windowed entity caches over JSON data",
    long_about = "Drive a windowed entity cache against a JSON data file.\n\n\
                  Pages, filters and sorts records the way a paging backend would,\n\
                  replays scripted event sequences and reconciles CRUD change logs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include record payloads in log output.
    #[arg(long = "log-payloads", global = true)]
    pub log_payloads: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load one page of a data file and print it.
    Page(PageArgs),

    /// Replay a JSON-lines event script against a data file.
    Replay(ReplayArgs),

    /// Reconcile a change log and print the entries to sync.
    Reconcile(ReconcileArgs),
}

/// Options shared by commands that run a store.
#[derive(Args, Clone)]
pub struct StoreArgs {
    /// JSON array of records, each with an `id` field.
    #[arg(long = "data", value_name = "FILE")]
    pub data: PathBuf,

    /// Store configuration (TOML). Defaults to a non-paginated store.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Apply filters to the cached records instead of refetching.
    #[arg(long = "local-filter")]
    pub local_filter: bool,

    /// Simulated source latency in milliseconds.
    #[arg(long = "latency-ms", value_name = "MS")]
    pub latency_ms: Option<u64>,
}

#[derive(Args)]
pub struct PageArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Page to show (0-based). Defaults to the first page.
    #[arg(long = "page")]
    pub page: Option<usize>,

    /// Filter as JSON, e.g. '{"name":"ada"}'.
    #[arg(long = "filter", value_name = "JSON")]
    pub filter: Option<String>,

    /// Sort as FIELD or FIELD:asc|desc.
    #[arg(long = "sort", value_name = "FIELD[:DIR]")]
    pub sort: Option<String>,

    /// Query string to restore, e.g. 'page=2&sortField=name'. Applied before
    /// the other flags.
    #[arg(long = "query", value_name = "QUERY")]
    pub query: Option<String>,

    /// Print the page as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// JSON-lines script, one step per line.
    #[arg(long = "script", value_name = "FILE")]
    pub script: PathBuf,

    /// Print the full change log as well as the reconciled one.
    #[arg(long = "full-changes")]
    pub full_changes: bool,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// JSON array of change log entries.
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Print the reconciled entries as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
