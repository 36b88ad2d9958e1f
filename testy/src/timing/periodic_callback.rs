use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Calls a callback every `interval` on a background tokio task, until stopped or dropped.
///
/// The first call happens one `interval` after starting. Errors returned by the callback,
/// and panics inside it, are logged and do not stop the timer.
pub struct PeriodicCallback {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicCallback {
    /// Starts the timer. Must be called from within a tokio runtime.
    pub fn start<F, E>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Display + 'static,
    {
        let token = CancellationToken::new();
        // Keep the caller's span, so that callback logs show up where the timer was started
        let handle = tokio::spawn(
            callback_loop(interval, callback, token.clone()).instrument(tracing::Span::current()),
        );
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Stops the timer and waits for an in-flight callback to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("Periodic callback task failed: {e}");
        }
    }
}

impl Drop for PeriodicCallback {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn callback_loop<F, E>(interval: Duration, mut callback: F, token: CancellationToken)
where
    F: FnMut() -> Result<(), E>,
    E: Display,
{
    let Some(first_tick) = Instant::now().checked_add(interval) else {
        // The first call would be past what the clock can represent
        token.cancelled().await;
        return;
    };
    let mut ticker = time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            () = token.cancelled() => {
                break;
            }
            _ = ticker.tick() => {}
        }
        match std::panic::catch_unwind(AssertUnwindSafe(&mut callback)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Error in periodic callback: {e}"),
            Err(_) => tracing::warn!("Periodic callback panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing_test::traced_test;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_calls_every_interval_until_stopped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let timer = PeriodicCallback::start(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });

        time::sleep(Duration::from_millis(350)).await;
        timer.stop().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_errors_and_panics_do_not_stop_the_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let timer = PeriodicCallback::start(Duration::from_millis(100), move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err("flaky dependency".to_string()),
                1 => panic!("callback exploded"),
                _ => Ok(()),
            }
        });

        time::sleep(Duration::from_millis(350)).await;
        timer.stop().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(logs_contain("Error in periodic callback: flaky dependency"));
        assert!(logs_contain("Periodic callback panicked"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let timer = PeriodicCallback::start(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        time::sleep(Duration::from_millis(150)).await;
        drop(timer);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_never_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let timer = PeriodicCallback::start(Duration::MAX, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        time::sleep(Duration::from_secs(3600)).await;
        timer.stop().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
