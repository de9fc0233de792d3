//! Trailing-edge debounce
//!
//! Time is passed in by the caller, so the debouncer is deterministic and the
//! runner's tick drives it.

use std::time::{Duration, Instant};

use tracing::trace;

/// Holds the latest pushed value until input has been quiet for `delay`
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value; replaces anything pending and restarts the wait
    pub fn push(&mut self, value: T, now: Instant) {
        trace!("Debouncer::push: called");
        self.pending = Some((value, now));
    }

    /// Release the pending value if the quiet period has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                trace!("Debouncer::poll: releasing value");
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Release the pending value now, regardless of time
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_releases_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.push("egg", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("egg"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_only_last_value_released() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.push("e", start);
        debouncer.push("eg", start + Duration::from_millis(200));
        debouncer.push("egg", start + Duration::from_millis(400));

        // 300ms after the first keystroke, but typing continued
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(700)), Some("egg"));
    }

    #[test]
    fn test_flush_and_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.push(1, start);
        assert_eq!(debouncer.flush(), Some(1));
        assert!(!debouncer.is_pending());

        debouncer.push(2, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + DELAY), None);
    }
}
