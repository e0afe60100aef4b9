//! Exponential reconnect delay

use hud_link_shared::defaults;
use std::time::Duration;

/// Delay between consecutive failed connection attempts
///
/// Starts at the initial delay, doubles after every failure and saturates
/// at the maximum. A successful connection resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Take the delay to wait now and escalate for the next failure
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Return to the initial delay
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(defaults::RECONNECT_DELAY_MS),
            Duration::from_millis(defaults::MAX_RECONNECT_DELAY_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_sequence_caps_at_max() {
        let mut backoff = Backoff::default();
        let delays: Vec<u128> = (0..12).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(
            delays,
            vec![
                2000, 4000, 8000, 16000, 32000, 64000, 128000, 256000, 300000, 300000, 300000,
                300000
            ]
        );
    }

    #[test]
    fn test_never_exceeds_max() {
        let mut backoff = Backoff::default();
        for _ in 0..100 {
            assert!(backoff.next_delay() <= Duration::from_millis(defaults::MAX_RECONNECT_DELAY_MS));
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = Backoff::default();
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Duration::from_millis(8000));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(4000));
    }

    #[test]
    fn test_max_below_initial() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }
}
