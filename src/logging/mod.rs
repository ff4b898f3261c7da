//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set. Otherwise the service logs at `info` and the
//! HTTP client stack at `warn`. Production deployments get one JSON object
//! per line; everything else gets coloured text.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::get_environment;

const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &str) -> Self {
        match environment.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber for the current `ENVIRONMENT`.
///
/// A second call keeps the first subscriber.
pub fn init_logging() -> LogFormat {
    let format = LogFormat::for_environment(&get_environment());
    let registry = tracing_subscriber::registry().with(env_filter());

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().compact().with_ansi(true).with_target(true))
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already set");
    }
    format
}
