use std::time::{Duration, Instant};

/// Measures the time between its creation and its drop, and logs it.
/// Useful for quick, low-ceremony benchmarks inside tests:
///
/// ```
/// use testy::timing::TimerScope;
///
/// {
///     let _scope = TimerScope::with_rate("insert 1000 rows", 1000);
///     // ... insert 1000 rows ...
/// } // logs "SCOPE 'insert 1000 rows' completed in ... ms | ... ms/item | ... items/ms"
/// ```
pub struct TimerScope {
    description: String,
    count_for_rate: Option<u64>,
    started: Instant,
}

impl TimerScope {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            count_for_rate: None,
            started: Instant::now(),
        }
    }

    /// Also logs the per-item rate for `count` items when the scope ends.
    pub fn with_rate(description: impl Into<String>, count: u64) -> Self {
        Self {
            description: description.into(),
            count_for_rate: Some(count),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for TimerScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let description = &self.description;
        match self.count_for_rate {
            Some(count) if count > 0 => {
                let count = count as f64;
                let ms_per_item = elapsed_ms / count;
                let items_per_ms = count / elapsed_ms;
                tracing::info!(
                    "SCOPE '{description}' completed in {elapsed_ms:.3} ms | {ms_per_item:.3} ms/item | {items_per_ms:.3} items/ms"
                );
            }
            _ => tracing::info!("SCOPE '{description}' completed in {elapsed_ms:.3} ms"),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn test_logs_on_drop() {
        {
            let scope = TimerScope::new("doing nothing");
            assert!(scope.elapsed() < Duration::from_secs(60));
        }
        assert!(logs_contain("SCOPE 'doing nothing' completed in"));
        assert!(!logs_contain("ms/item"));
    }

    #[test]
    #[traced_test]
    fn test_logs_rate() {
        {
            let _scope = TimerScope::with_rate("sleeping", 4);
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(logs_contain("SCOPE 'sleeping' completed in"));
        assert!(logs_contain("ms/item"));
        assert!(logs_contain("items/ms"));
    }

    #[test]
    #[traced_test]
    fn test_zero_count_skips_rate() {
        drop(TimerScope::with_rate("empty batch", 0));
        assert!(logs_contain("SCOPE 'empty batch' completed in"));
        assert!(!logs_contain("ms/item"));
    }
}
