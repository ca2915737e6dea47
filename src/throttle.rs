//! Fetch throttle: at most one chain read per window, none while one is in
//! flight or while the user is writing a new stream.
//!
//! Advisory only. Callers check and begin in one step on the UI thread.

use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(3000);

#[derive(Debug)]
pub struct FetchThrottle {
    window: Duration,
    last_start: Option<Instant>,
    in_flight: bool,
    writing: bool,
}

impl FetchThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_start: None,
            in_flight: false,
            writing: false,
        }
    }

    /// Record a fetch start at `now` if one is allowed
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if self.in_flight || self.writing {
            return false;
        }
        if let Some(last) = self.last_start {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last_start = Some(now);
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn set_writing(&mut self, writing: bool) {
        self.writing = writing;
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

impl Default for FetchThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_accepted() {
        let mut throttle = FetchThrottle::default();
        assert!(throttle.try_begin(Instant::now()));
        assert!(throttle.is_in_flight());
    }

    #[test]
    fn test_rejects_inside_window() {
        let mut throttle = FetchThrottle::default();
        let t0 = Instant::now();
        assert!(throttle.try_begin(t0));
        throttle.finish();
        assert!(!throttle.try_begin(t0 + Duration::from_millis(2999)));
    }

    #[test]
    fn test_accepts_at_window_boundary() {
        let mut throttle = FetchThrottle::default();
        let t0 = Instant::now();
        assert!(throttle.try_begin(t0));
        throttle.finish();
        assert!(throttle.try_begin(t0 + Duration::from_millis(3000)));
        throttle.finish();
        assert!(!throttle.try_begin(t0 + Duration::from_millis(5999)));
        assert!(throttle.try_begin(t0 + Duration::from_millis(6500)));
    }

    #[test]
    fn test_rejected_attempt_does_not_move_window() {
        let mut throttle = FetchThrottle::default();
        let t0 = Instant::now();
        assert!(throttle.try_begin(t0));
        throttle.finish();
        assert!(!throttle.try_begin(t0 + Duration::from_millis(2000)));
        assert!(throttle.try_begin(t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_in_flight_blocks_even_after_window() {
        let mut throttle = FetchThrottle::default();
        let t0 = Instant::now();
        assert!(throttle.try_begin(t0));
        assert!(!throttle.try_begin(t0 + Duration::from_secs(10)));
        throttle.finish();
        assert!(throttle.try_begin(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_writing_blocks_fetch() {
        let mut throttle = FetchThrottle::default();
        throttle.set_writing(true);
        assert!(!throttle.try_begin(Instant::now()));
        throttle.set_writing(false);
        assert!(throttle.try_begin(Instant::now()));
    }

    #[test]
    fn test_custom_window() {
        let mut throttle = FetchThrottle::new(Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(throttle.try_begin(t0));
        throttle.finish();
        assert!(!throttle.try_begin(t0 + Duration::from_millis(499)));
        assert!(throttle.try_begin(t0 + Duration::from_millis(500)));
    }
}
