use std::time::{Duration, Instant};

/// Longest step reported by a single tick.
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Per-frame clock driving the update/render loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
    last: Instant,
    delta: Duration,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            started: now,
            last: now,
            delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Advances to now and returns the frame delta in seconds.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Advances to `now`. Instants earlier than the previous tick count as a
    /// zero delta.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        self.delta = now.saturating_duration_since(self.last).min(MAX_DELTA);
        self.last = self.last.max(now);
        self.frames += 1;
        self.delta.as_secs_f64()
    }

    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last - self.started
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_clamped_and_monotonic() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);

        let dt = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-9);

        assert_eq!(clock.tick_at(t0 + Duration::from_secs(5)), MAX_DELTA.as_secs_f64());
        assert_eq!(clock.tick_at(t0), 0.0);
        assert_eq!(clock.frame_count(), 3);
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }
}
