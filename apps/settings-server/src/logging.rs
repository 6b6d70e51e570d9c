// Logging, powered by tracing-subscriber.
//
// Console output always; an optional append-only file carries the same events.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the base level plus overrides for noisy crates.
///
/// `RUST_LOG`, when set, wins over everything.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.to_owned()];
    let noisy: &[(&str, &str)] = &[
        ("hyper", "warn"),
        ("h2", "warn"),
        ("sqlx", "warn"),
        ("sea_orm", "warn"),
        ("sea_orm_migration", "info"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{target}={lvl}"));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{filter_str}': {e}"))
}

/// Install the global subscriber.
///
/// # Errors
/// Invalid filter directive or an unwritable log file.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let format = LogFormat::parse(&cfg.format);

    let console_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(build_env_filter(&cfg.level)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_filter(build_env_filter(&cfg.level)?)
            .boxed(),
    };

    let file_layer = match &cfg.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let log_file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file));
            Some(match format {
                LogFormat::Json => layer
                    .json()
                    .with_span_list(true)
                    .with_filter(build_env_filter(&cfg.level)?)
                    .boxed(),
                LogFormat::Compact => layer.with_filter(build_env_filter(&cfg.level)?).boxed(),
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(level = %cfg.level, format = ?format, "logging initialized");
    Ok(())
}
