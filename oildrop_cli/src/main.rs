#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod analyze;
mod cli;
mod error_fmt;

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, WrapErr};
use oildrop_config::Config;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    // Clap handles its own errors (exit code 2) inside parse()
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "command failed");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let (cfg, cfg_path) = load_config(cli.config.as_deref())?;
    init_tracing(&cfg, cli.json, cli.log_level.as_deref())?;
    tracing::debug!(config = ?cfg_path, "config loaded");

    match &cli.cmd {
        Commands::Analyze { input, overrides } => {
            analyze::run_analyze(&cfg, input, overrides, cli.json)
        }
        Commands::Charge { v_rise, v_fall } => {
            analyze::run_charge(&cfg, *v_rise, *v_fall, cli.json)
        }
        Commands::Batch {
            dirs,
            workers,
            overrides,
        } => analyze::run_batch(&cfg, dirs, *workers, overrides, cli.json),
        Commands::Check => analyze::run_check(&cfg, cfg_path.as_deref(), cli.json),
    }
}

/// An explicit --config must exist; the default path is optional.
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = oildrop_config::load_config_file(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        let cfg = oildrop_config::load_config_file(default)?;
        return Ok((cfg, Some(default.to_path_buf())));
    }
    Ok((Config::default(), None))
}

fn init_tracing(cfg: &Config, json: bool, cli_level: Option<&str>) -> Result<()> {
    // RUST_LOG wins, then --log-level, then [logging].level
    let level = cli_level
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file_layer = match cfg.logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file:?}"))?;
            let appender = match cfg.logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
