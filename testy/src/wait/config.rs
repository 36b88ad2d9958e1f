use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorDetails};

/// How long a wait may take before it is abandoned.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to sleep between two evaluations of the predicates.
/// Kept off round numbers so that polling does not fall into lock-step with round-interval producers.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(153);

#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct WaitConfig {
    #[serde(
        rename = "timeout_ms",
        with = "duration_ms",
        default = "default_timeout"
    )]
    pub timeout: Duration,
    #[serde(
        rename = "poll_interval_ms",
        with = "duration_ms",
        default = "default_poll_interval"
    )]
    pub poll_interval: Duration,
}

impl std::fmt::Display for WaitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl WaitConfig {
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    /// Rejects configurations that could never produce a meaningful wait.
    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout.is_zero() {
            return Err(Error::new(ErrorDetails::InvalidArgument {
                argument: "timeout",
                message: "must be greater than zero".to_string(),
            }));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::new(ErrorDetails::InvalidArgument {
                argument: "poll_interval",
                message: "must be greater than zero".to_string(),
            }));
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
