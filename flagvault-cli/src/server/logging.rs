use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

use super::config::LogConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Install the global subscriber. `RUST_LOG` directives win over the
/// configured level. Output goes to stderr so client commands keep stdout
/// for their results.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = layer().with_writer(std::io::stderr);
    let fmt_layer = if config.json {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.compact().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    level
        .trim()
        .parse()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}
