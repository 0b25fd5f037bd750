use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "STREAMPLAN_LOG";
const LOG_FORMAT_ENV: &str = "STREAMPLAN_LOG_FORMAT";

pub fn logs_are_json() -> bool {
    matches!(std::env::var(LOG_FORMAT_ENV).as_deref(), Ok("json"))
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs the global subscriber.
/// - Filter from `STREAMPLAN_LOG`, then `RUST_LOG`, then `default_directive`
/// - `STREAMPLAN_LOG_FORMAT=json` switches to one JSON object per event
/// - With `log_file`, events are appended there instead of stderr so the
///   terminal UI is never written over
pub fn init_tracing(log_file: Option<&Path>, default_directive: &str) -> Result<()> {
    let (writer, ansi) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);
    let builder = tracing_subscriber::registry().with(env_filter(default_directive));

    if logs_are_json() {
        let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        let _ = builder.with(fmt_layer.compact()).try_init();
    }
    Ok(())
}
