//! `wincache` command line tool.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use wincache_cli::logging::{LogConfig, LogFormat, init_logging};
use wincache_cli::summary::{print_changes, print_page};

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_page, run_reconcile, run_replay};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Page(args) => match run_page(&args) {
            Ok(view) if args.json => print_json(&view),
            Ok(view) => {
                print_page(&view);
                i32::from(view.status.is_fail())
            }
            Err(error) => report(&error),
        },
        Command::Replay(args) => match run_replay(&args) {
            Ok(outcome) => {
                println!("Replayed {} steps.", outcome.steps);
                print_page(&outcome.page);
                print_changes("Changes to sync", &outcome.changes);
                if args.full_changes {
                    print_changes("Full change log", &outcome.full_changes);
                }
                i32::from(outcome.page.status.is_fail())
            }
            Err(error) => report(&error),
        },
        Command::Reconcile(args) => match run_reconcile(&args) {
            Ok((_, rows)) if args.json => print_json(&rows),
            Ok((raw, rows)) => {
                println!("{raw} entries reconciled to {}.", rows.len());
                print_changes("Changes to sync", &rows);
                0
            }
            Err(error) => report(&error),
        },
    };
    std::process::exit(exit_code);
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn report(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_payloads = cli.log_payloads;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
