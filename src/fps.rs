//! Rolling frame-rate counter.
//!
//! Counts frames over fixed windows: each tick increments the tally, and
//! when the elapsed time since the window start reaches the window length
//! the rate becomes `tally / elapsed` and both tally and window start are
//! reset together. The reported rate is 0.0 until the first window closes
//! and updates at most once per window thereafter.

use std::time::{Duration, Instant};

pub struct FpsCounter {
    frame_count: u64,
    window_start: Instant,
    window: Duration,
    current: f64,
}

impl FpsCounter {
    /// Counter with the standard 1-second window.
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self::new_at(window, Instant::now())
    }

    fn new_at(window: Duration, start: Instant) -> Self {
        Self {
            frame_count: 0,
            window_start: start,
            window,
            current: 0.0,
        }
    }

    /// Record one frame and return the rate to display.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        self.frame_count += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            self.current = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.window_start = now;
        }
        self.current
    }

    /// Most recently computed rate (0.0 before the first window closes).
    pub fn current(&self) -> f64 {
        self.current
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn rate_is_zero_until_first_window_closes() {
        let start = Instant::now();
        let mut counter = FpsCounter::new_at(WINDOW, start);

        for i in 1..=9 {
            let rate = counter.tick_at(start + Duration::from_millis(i * 100));
            assert_eq!(rate, 0.0);
        }
        assert_eq!(counter.current(), 0.0);
    }

    #[test]
    fn rate_is_count_over_elapsed_when_window_closes() {
        let start = Instant::now();
        let mut counter = FpsCounter::new_at(WINDOW, start);

        for i in 1..=3 {
            counter.tick_at(start + Duration::from_millis(i * 300));
        }
        // Fourth tick crosses the 1-second mark at 1.2s elapsed.
        let rate = counter.tick_at(start + Duration::from_millis(1200));
        assert!((rate - 4.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn tally_and_window_reset_together() {
        let start = Instant::now();
        let mut counter = FpsCounter::new_at(WINDOW, start);

        counter.tick_at(start + Duration::from_millis(500));
        counter.tick_at(start + Duration::from_millis(1000));
        assert_eq!(counter.frame_count, 0);
        assert_eq!(counter.window_start, start + Duration::from_millis(1000));

        // The next window starts fresh: rate holds until it closes again.
        let held = counter.tick_at(start + Duration::from_millis(1100));
        assert_eq!(held, counter.current());
        assert_eq!(counter.frame_count, 1);
    }

    #[test]
    fn rate_updates_at_most_once_per_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::new_at(WINDOW, start);

        counter.tick_at(start + Duration::from_millis(1000));
        let first = counter.current();

        // Ticks inside the second window keep reporting the first rate.
        for i in 1..=9 {
            let rate = counter.tick_at(start + Duration::from_millis(1000 + i * 100));
            assert_eq!(rate, first);
        }
    }
}
