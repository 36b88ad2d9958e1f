//! Waiting for a condition over some shared state to become true.
//!
//! [`wait_or_die`] polls a completion condition over a subject on a fixed cadence until it holds.
//! An optional failure condition makes the wait fail as soon as it holds, without waiting for
//! the deadline. Between two evaluations the calling task is suspended on the tokio timer, so
//! a pending wait does not occupy a worker thread.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! use testy::predicate;
//! use testy::wait::wait_or_die;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), testy::Error> {
//! let processed = Arc::new(AtomicUsize::new(0));
//! let worker = processed.clone();
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     worker.store(3, Ordering::SeqCst);
//! });
//!
//! wait_or_die(&*processed, predicate!(|n: &AtomicUsize| n.load(Ordering::SeqCst) == 3))
//!     .fail_if(predicate!(|n: &AtomicUsize| n.load(Ordering::SeqCst) > 3))
//!     .timeout(Duration::from_secs(2))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Each poll tick evaluates the failure condition first, then the completion condition, so a
//! state that satisfies both counts as a failure.

mod config;
mod outcome;
mod predicate;

use std::fmt::Debug;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorDetails};

pub use config::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig};
pub use outcome::{FailureReport, NO_DETAILS, WaitOutcome};
pub use predicate::{Predicate, PredicateError};

type DetailsFn<'a> = Box<dyn FnOnce() -> String + Send + 'a>;

/// A pending wait, built by [`wait_or_die`].
///
/// Awaiting it directly is the same as calling [`WaitOrDie::run`].
#[must_use = "a wait does nothing unless it is awaited"]
pub struct WaitOrDie<'a, S: ?Sized> {
    subject: &'a S,
    completion: Predicate<'a, S>,
    failure: Option<Predicate<'a, S>>,
    config: WaitConfig,
    details: Option<DetailsFn<'a>>,
    cancellation: Option<CancellationToken>,
}

/// Starts building a wait for `completion` to hold on `subject`.
///
/// Defaults: a 5 s timeout, a 153 ms poll interval, and no failure condition.
pub fn wait_or_die<'a, S: Debug + ?Sized>(
    subject: &'a S,
    completion: Predicate<'a, S>,
) -> WaitOrDie<'a, S> {
    WaitOrDie {
        subject,
        completion,
        failure: None,
        config: WaitConfig::default(),
        details: None,
        cancellation: None,
    }
}

impl<'a, S: Debug + ?Sized> WaitOrDie<'a, S> {
    /// Fails the wait as soon as `failure` holds.
    pub fn fail_if(self, failure: Predicate<'a, S>) -> Self {
        Self {
            failure: Some(failure),
            ..self
        }
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            config: self.config.with_timeout(timeout),
            ..self
        }
    }

    pub fn poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            config: self.config.with_poll_interval(poll_interval),
            ..self
        }
    }

    pub fn with_config(self, config: WaitConfig) -> Self {
        Self { config, ..self }
    }

    /// Supplies extra text for the failure message.
    /// It is only called when the wait fails, and at most once.
    pub fn details(self, supplier: impl FnOnce() -> String + Send + 'a) -> Self {
        Self {
            details: Some(Box::new(supplier)),
            ..self
        }
    }

    /// Ends the wait early when `token` is cancelled.
    /// A cancelled wait resolves to [`WaitOutcome::TimedOut`], with `cancelled` set in the report.
    pub fn cancel_on(self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self
        }
    }

    /// Runs the wait and returns how it ended.
    ///
    /// Only an invalid configuration or a failing fallible predicate produce an `Err` here;
    /// failed and timed out waits are reported as [`WaitOutcome`] values.
    pub async fn outcome(self) -> Result<WaitOutcome, Error> {
        let WaitOrDie {
            subject,
            completion,
            failure,
            config,
            details,
            cancellation,
        } = self;
        config.validate()?;
        let cancellation = cancellation.unwrap_or_default();

        let started = Instant::now();
        // `None` when the timeout reaches past what the clock can represent: the wait never expires
        let deadline = started.checked_add(config.timeout);
        let mut ticks: u64 = 0;

        while deadline.is_none_or(|deadline| Instant::now() < deadline)
            && !cancellation.is_cancelled()
        {
            ticks += 1;
            tracing::trace!(tick = ticks, condition = %completion, "Evaluating wait conditions");

            let failed = match &failure {
                Some(failure) => evaluate(failure, subject)?,
                None => false,
            };
            if failed {
                let elapsed = started.elapsed();
                tracing::debug!(
                    condition = %completion,
                    ticks,
                    elapsed_ms = elapsed.as_millis(),
                    "Wait failed fast"
                );
                let report = FailureReport {
                    completion: completion.to_string(),
                    failure: failure.as_ref().map(ToString::to_string),
                    subject: format!("{subject:?}"),
                    elapsed,
                    timeout: config.timeout,
                    details: collect_details(details),
                    cancelled: false,
                };
                return Ok(WaitOutcome::FailedFast(report));
            }

            if evaluate(&completion, subject)? {
                let elapsed = started.elapsed();
                tracing::debug!(
                    condition = %completion,
                    ticks,
                    elapsed_ms = elapsed.as_millis(),
                    "Wait condition satisfied"
                );
                return Ok(WaitOutcome::Satisfied { elapsed });
            }

            // `sleep` saturates intervals that would overflow the clock
            let nap = match deadline {
                Some(deadline) => config
                    .poll_interval
                    .min(deadline.saturating_duration_since(Instant::now())),
                None => config.poll_interval,
            };
            tokio::select! {
                () = tokio::time::sleep(nap) => {}
                () = cancellation.cancelled() => {}
            }
        }

        let elapsed = started.elapsed();
        let cancelled = cancellation.is_cancelled() && elapsed < config.timeout;
        tracing::debug!(
            condition = %completion,
            ticks,
            elapsed_ms = elapsed.as_millis(),
            cancelled,
            "Wait timed out"
        );
        Ok(WaitOutcome::TimedOut(FailureReport {
            completion: completion.to_string(),
            failure: failure.as_ref().map(ToString::to_string),
            subject: format!("{subject:?}"),
            elapsed,
            timeout: config.timeout,
            details: collect_details(details),
            cancelled,
        }))
    }

    /// Runs the wait, returning the elapsed time if the completion condition was satisfied.
    pub async fn run(self) -> Result<Duration, Error> {
        self.outcome().await?.into_result()
    }

    /// Runs the wait, panicking with the full failure message unless it succeeds.
    ///
    /// # Panics
    ///
    /// Panics if the wait fails fast, times out, or cannot be run at all.
    #[expect(clippy::panic)]
    pub async fn or_die(self) -> Duration {
        match self.run().await {
            Ok(elapsed) => elapsed,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, S: Debug + Sync + ?Sized + 'a> IntoFuture for WaitOrDie<'a, S> {
    type Output = Result<Duration, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

fn evaluate<S: ?Sized>(predicate: &Predicate<'_, S>, subject: &S) -> Result<bool, Error> {
    predicate.evaluate(subject).map_err(|source| {
        Error::new(ErrorDetails::PredicateFault {
            predicate: predicate.to_string(),
            source,
        })
    })
}

/// Calls the diagnostic supplier, if any.
/// A panicking supplier must not hide why the wait failed, so the panic is caught and described.
fn collect_details(details: Option<DetailsFn<'_>>) -> String {
    let Some(details) = details else {
        return NO_DETAILS.to_string();
    };
    match std::panic::catch_unwind(AssertUnwindSafe(details)) {
        Ok(text) => text,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!("Failure details supplier panicked: {message}");
            format!("<failed to collect details: {message}>")
        }
    }
}
