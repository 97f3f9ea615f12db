//! Entry point for the terminal speed reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml` and any per-document overrides.
//! - Read the document text.
//! - Hand everything to the reading loop in `app`.

mod app;
mod cache;
mod cancellation;
mod config;
mod frame_timer;
mod input;
mod render;
mod settings;

use crate::app::{Document, run_reader};
use crate::cache::{document_config_path, load_document_config};
use crate::cancellation::cancel_on_ctrlc;
use crate::config::load_config;
use crate::settings::SettingsStore;
use anyhow::{Context, Result, anyhow};
use speedread_core::progress::document_key;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "Usage: speedread <path-to-text> [--wpm N]";

#[derive(Debug, PartialEq)]
struct CliArgs {
    path: PathBuf,
    wpm: Option<u32>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    if !args.path.exists() {
        return Err(anyhow!("File not found: {}", args.path.display()));
    }

    let base_config = load_config(Path::new("conf/config.toml"));
    let key = document_key(&args.path.to_string_lossy());
    let cache_root = PathBuf::from(&base_config.cache_dir);
    let mut config = base_config.clone();
    if let Some(overrides) = load_document_config(&cache_root, &key) {
        info!("Loaded per-document overrides from cache");
        config = overrides.with_base_overrides(&base_config);
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.path.display(),
        level = %config.log_level,
        wpm = config.wpm,
        mode = %config.activation_mode,
        "Starting speed reader"
    );

    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let mut settings = SettingsStore::new(config, Some(document_config_path(&cache_root, &key)));
    if let Some(wpm) = args.wpm {
        settings.set_wpm(wpm);
    }

    let cancel = cancel_on_ctrlc()?;
    run_reader(Document { key, text }, settings, cancel).context("Reading session failed")?;
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut path = None;
    let mut wpm = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--wpm" => {
                let value = args.next().ok_or_else(|| anyhow!("--wpm needs a value"))?;
                let parsed = value
                    .parse::<u32>()
                    .with_context(|| format!("Invalid --wpm value: {value}"))?;
                wpm = Some(parsed);
            }
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            _ if path.is_none() => path = Some(PathBuf::from(&arg)),
            _ => return Err(anyhow!("Unexpected argument: {arg}\n{USAGE}")),
        }
    }
    let path = path.ok_or_else(|| anyhow!(USAGE))?;
    Ok(CliArgs { path, wpm })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
