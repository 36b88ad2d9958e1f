//! Logging setup for tests.
//!
//! Everything in this crate logs through `tracing`. Call [`setup_test_logging`] at the start of
//! a test (or in a fixture) to see those logs; output goes through the libtest capture writer,
//! so it only shows up for failing tests unless `--nocapture` is passed.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{Error, ErrorDetails};

/// Environment variable holding `EnvFilter` directives that replace the defaults.
pub const LOG_ENV_VAR: &str = "TESTY_LOG";

const DEFAULT_DIRECTIVES: &str = "warn,testy=info";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn build_filter() -> Result<EnvFilter, Error> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) => EnvFilter::builder().parse(&directives).map_err(|e| {
            Error::new(ErrorDetails::Observability {
                message: format!("Invalid `{LOG_ENV_VAR}` environment variable: {e}"),
            })
        }),
        Err(_) => EnvFilter::builder().parse(DEFAULT_DIRECTIVES).map_err(|e| {
            Error::new(ErrorDetails::Observability {
                message: format!(
                    "Failed to parse default log directives - this should never happen: {e}"
                ),
            })
        }),
    }
}

/// Installs a global `tracing` subscriber for the current test binary.
///
/// Only the first call installs anything; later calls (e.g. from other tests in the same
/// binary) are no-ops.
pub fn setup_test_logging(log_format: LogFormat) -> Result<(), Error> {
    let filter = build_filter()?;
    let layer = match log_format {
        LogFormat::Pretty => Box::new(tracing_subscriber::fmt::layer().with_test_writer())
            as Box<dyn Layer<Registry> + Send + Sync>,
        LogFormat::Json => Box::new(tracing_subscriber::fmt::layer().json().with_test_writer()),
    };
    if tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .is_err()
    {
        tracing::debug!("A global tracing subscriber is already installed");
    }
    Ok(())
}
