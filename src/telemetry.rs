//! Tracing subscriber setup.
//!
//! Log lines never go to the interactive terminal by default: they are appended to
//! `<root>/.debug/aeronull.log`. `AERONULL_TRACING_FMT=1` sends them to stderr instead.
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

pub const LOG_FILE_NAME: &str = "aeronull.log";

static INIT: OnceCell<Option<PathBuf>> = OnceCell::new();

fn filter_directive() -> String {
    ["AERONULL_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|k| env::var(k).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn fmt_to_stderr() -> bool {
    env::var("AERONULL_TRACING_FMT").ok().as_deref() == Some("1")
}

/// Install the global subscriber once. Returns the log file path when logging to a file.
///
/// Failures (unwritable debug dir, subscriber already set) are reported on stderr and leave
/// the process without a subscriber; they are never fatal.
pub fn telemetry_init(debug_dir: &Path) -> Option<PathBuf> {
    INIT.get_or_init(|| install(debug_dir)).clone()
}

fn install(debug_dir: &Path) -> Option<PathBuf> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter_directive())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if fmt_to_stderr() {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_err()
        {
            eprintln!("aeronull: telemetry init skipped (global subscriber already set)");
        }
        return None;
    }

    let path = debug_dir.join(LOG_FILE_NAME);
    let file = match fs::create_dir_all(debug_dir).and_then(|_| {
        OpenOptions::new().create(true).append(true).open(&path)
    }) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("aeronull: cannot open log file {}: {e}", path.display());
            return None;
        }
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("aeronull: telemetry init skipped (global subscriber already set)");
        return None;
    }
    Some(path)
}
