use std::time::Duration;

use crate::error::{Error, ErrorDetails};

/// Text used in failure reports when no diagnostic supplier was given.
pub const NO_DETAILS: &str = "NONE";

/// Everything we know about a wait that did not end in success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    /// Description of the completion condition.
    pub completion: String,
    /// Description of the failure condition, if one was supplied.
    pub failure: Option<String>,
    /// `Debug` rendering of the subject, taken when the wait resolved.
    pub subject: String,
    pub elapsed: Duration,
    pub timeout: Duration,
    /// Output of the diagnostic supplier, or [`NO_DETAILS`].
    pub details: String,
    /// Set when an external cancellation ended the wait before the deadline.
    pub cancelled: bool,
}

/// The three ways a wait can end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied { elapsed: Duration },
    FailedFast(FailureReport),
    TimedOut(FailureReport),
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Satisfied { elapsed } => *elapsed,
            WaitOutcome::FailedFast(report) | WaitOutcome::TimedOut(report) => report.elapsed,
        }
    }

    /// Turns the non-successful outcomes into errors, returning the elapsed time on success.
    pub fn into_result(self) -> Result<Duration, Error> {
        match self {
            WaitOutcome::Satisfied { elapsed } => Ok(elapsed),
            WaitOutcome::FailedFast(report) => Err(Error::new(ErrorDetails::FailedFast(report))),
            WaitOutcome::TimedOut(report) => Err(Error::new(ErrorDetails::TimedOut(report))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        let elapsed = Duration::from_millis(20);
        assert_eq!(
            WaitOutcome::Satisfied { elapsed }.into_result().unwrap(),
            elapsed
        );

        let report = FailureReport {
            completion: "done".to_string(),
            failure: None,
            subject: "subject".to_string(),
            elapsed,
            timeout: Duration::from_secs(1),
            details: NO_DETAILS.to_string(),
            cancelled: false,
        };
        let outcome = WaitOutcome::TimedOut(report.clone());
        assert!(!outcome.is_satisfied());
        assert_eq!(outcome.elapsed(), elapsed);
        let error = outcome.into_result().unwrap_err();
        assert!(error.is_timed_out());
        assert_eq!(error.report(), Some(&report));

        let error = WaitOutcome::FailedFast(report).into_result().unwrap_err();
        assert!(error.is_failed_fast());
    }
}
