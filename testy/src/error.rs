use std::fmt::{self, Display};

use thiserror::Error;

use crate::wait::{FailureReport, PredicateError};

#[derive(Debug, Error)]
#[error(transparent)]
// As long as the struct member is private, we force people to use the `new` method and log the error.
// We box `ErrorDetails` per the `clippy::result_large_err` lint (failure reports carry a lot of text).
pub struct Error(Box<ErrorDetails>);

impl Error {
    pub fn new(details: ErrorDetails) -> Self {
        details.log();
        Error(Box::new(details))
    }

    pub fn get_details(&self) -> &ErrorDetails {
        &self.0
    }

    pub fn into_details(self) -> ErrorDetails {
        *self.0
    }

    /// Returns `true` if a wait ended because its failure condition was satisfied.
    pub fn is_failed_fast(&self) -> bool {
        matches!(*self.0, ErrorDetails::FailedFast(_))
    }

    /// Returns `true` if a wait reached its deadline (or was cancelled) before resolving.
    pub fn is_timed_out(&self) -> bool {
        matches!(*self.0, ErrorDetails::TimedOut(_))
    }

    /// The failure report attached to a `FailedFast` or `TimedOut` error.
    pub fn report(&self) -> Option<&FailureReport> {
        match &*self.0 {
            ErrorDetails::FailedFast(report) | ErrorDetails::TimedOut(report) => Some(report),
            _ => None,
        }
    }

    pub fn log(&self) {
        self.0.log();
    }
}

impl From<ErrorDetails> for Error {
    fn from(details: ErrorDetails) -> Self {
        Error::new(details)
    }
}

#[derive(Debug, Error)]
pub enum ErrorDetails {
    EmptyPickSource {
        count: usize,
        item_type: &'static str,
    },
    FailedFast(FailureReport),
    InvalidArgument {
        argument: &'static str,
        message: String,
    },
    Io {
        message: String,
    },
    Observability {
        message: String,
    },
    PredicateFault {
        predicate: String,
        #[source]
        source: PredicateError,
    },
    Serialization {
        message: String,
    },
    TimedOut(FailureReport),
}

impl ErrorDetails {
    fn level(&self) -> tracing::Level {
        match self {
            ErrorDetails::EmptyPickSource { .. } => tracing::Level::WARN,
            ErrorDetails::FailedFast(_) => tracing::Level::WARN,
            ErrorDetails::InvalidArgument { .. } => tracing::Level::ERROR,
            ErrorDetails::Io { .. } => tracing::Level::ERROR,
            ErrorDetails::Observability { .. } => tracing::Level::ERROR,
            ErrorDetails::PredicateFault { .. } => tracing::Level::ERROR,
            ErrorDetails::Serialization { .. } => tracing::Level::ERROR,
            ErrorDetails::TimedOut(_) => tracing::Level::WARN,
        }
    }

    pub fn log_at_level(&self, prefix: &str, level: tracing::Level) {
        match level {
            tracing::Level::ERROR => tracing::error!("{prefix}{self}"),
            tracing::Level::WARN => tracing::warn!("{prefix}{self}"),
            tracing::Level::INFO => tracing::info!("{prefix}{self}"),
            tracing::Level::DEBUG => tracing::debug!("{prefix}{self}"),
            tracing::Level::TRACE => tracing::trace!("{prefix}{self}"),
        }
    }

    /// Log the error using the `tracing` library
    pub fn log(&self) {
        self.log_at_level("", self.level());
    }
}

impl Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetails::EmptyPickSource { count, item_type } => write!(
                f,
                "Cannot make {count} random picks from list of {item_type} because it is empty"
            ),
            ErrorDetails::FailedFast(report) => {
                let failure = report.failure.as_deref().unwrap_or("<none>");
                write!(
                    f,
                    "Waiting for\n\n    {completion}\n\non {subject} failed, because the failure condition\n\n    {failure}\n\nwas satisfied after {elapsed:.1} s.\n\nDetails:\n\n{details}",
                    completion = report.completion,
                    subject = report.subject,
                    elapsed = report.elapsed.as_secs_f64(),
                    details = report.details,
                )
            }
            ErrorDetails::InvalidArgument { argument, message } => {
                write!(f, "Invalid argument `{argument}`: {message}")
            }
            ErrorDetails::Io { message } => write!(f, "I/O error: {message}"),
            ErrorDetails::Observability { message } => {
                write!(f, "Error setting up test logging: {message}")
            }
            ErrorDetails::PredicateFault { predicate, source } => {
                write!(f, "Error evaluating condition `{predicate}`: {source}")
            }
            ErrorDetails::Serialization { message } => write!(f, "{message}"),
            ErrorDetails::TimedOut(report) => {
                let reason = if report.cancelled {
                    "was cancelled after"
                } else {
                    "did not complete within"
                };
                write!(
                    f,
                    "Waiting for\n\n    {completion}\n\non {subject} {reason} {elapsed:.1} s (timeout: {timeout:.1} s)\n\nDetails:\n\n{details}",
                    completion = report.completion,
                    subject = report.subject,
                    elapsed = report.elapsed.as_secs_f64(),
                    timeout = report.timeout.as_secs_f64(),
                    details = report.details,
                )
            }
        }
    }
}
