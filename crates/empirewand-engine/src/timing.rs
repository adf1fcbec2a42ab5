//! Fixed-step tick clock.
//!
//! Waves advance once per server tick. In realtime mode the clock paces the
//! loop to the configured interval; otherwise ticks run back to back.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Paces and measures simulation ticks.
#[derive(Debug)]
pub struct TickClock {
    /// Time budget per tick
    interval: Duration,
    /// Whether to sleep out the remainder of each tick
    realtime: bool,
    /// Start of the current tick
    tick_start: Instant,
    /// Ticks completed
    ticks: u64,
    /// Recent tick work durations in seconds
    samples: VecDeque<f32>,
    /// Maximum samples kept
    max_samples: usize,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(50)
    }
}

impl TickClock {
    /// Clock with a tick every `interval_ms` milliseconds.
    #[must_use]
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms.max(1)),
            realtime: false,
            tick_start: Instant::now(),
            ticks: 0,
            samples: VecDeque::with_capacity(100),
            max_samples: 100,
        }
    }

    /// Pace ticks to wall-clock time.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Marks the start of a tick.
    pub fn begin_tick(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Marks the end of a tick, recording its duration and, in realtime
    /// mode, sleeping for whatever is left of the interval.
    pub fn end_tick(&mut self) {
        let work = self.tick_start.elapsed();
        self.record(work);
        self.ticks += 1;

        if self.realtime && work < self.interval {
            std::thread::sleep(self.interval - work);
        }
    }

    fn record(&mut self, work: Duration) {
        self.samples.push_back(work.as_secs_f32());
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    /// Average tick work time in milliseconds.
    #[must_use]
    pub fn average_tick_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32 * 1000.0
    }

    /// Share of the interval used by the average tick.
    #[must_use]
    pub fn load(&self) -> f32 {
        self.average_tick_ms() / (self.interval.as_secs_f32() * 1000.0)
    }

    /// Simulated time covered by the completed ticks.
    #[must_use]
    pub fn simulated(&self) -> Duration {
        self.interval * u32::try_from(self.ticks).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = TickClock::new(50);
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.simulated(), Duration::ZERO);
        assert_eq!(clock.average_tick_ms(), 0.0);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let mut clock = TickClock::new(0);
        clock.begin_tick();
        clock.end_tick();
        assert_eq!(clock.simulated(), Duration::from_millis(1));
    }

    #[test]
    fn test_tick_counting() {
        let mut clock = TickClock::new(50);
        for _ in 0..3 {
            clock.begin_tick();
            clock.end_tick();
        }
        assert_eq!(clock.ticks(), 3);
        assert_eq!(clock.simulated(), Duration::from_millis(150));
        assert!(clock.average_tick_ms() < 50.0);
    }

    #[test]
    fn test_realtime_paces_ticks() {
        let mut clock = TickClock::new(20).with_realtime(true);
        let start = Instant::now();
        clock.begin_tick();
        clock.end_tick();
        assert!(start.elapsed() >= Duration::from_millis(19));
    }

    #[test]
    fn test_load() {
        let mut clock = TickClock::new(1000);
        clock.begin_tick();
        clock.end_tick();
        assert!(clock.load() < 1.0);
    }
}
