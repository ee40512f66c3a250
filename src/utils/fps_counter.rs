/// Averages the frame rate over one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_frames: u32,
    window_seconds: f64,
    current: Option<f64>,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame of `dt` seconds. Returns the new average when a
    /// window closes.
    pub fn record(&mut self, dt: f64) -> Option<f64> {
        self.window_frames += 1;
        self.window_seconds += dt.max(0.0);
        if self.window_seconds < 1.0 {
            return None;
        }

        let fps = f64::from(self.window_frames) / self.window_seconds;
        self.window_frames = 0;
        self.window_seconds = 0.0;
        self.current = Some(fps);
        Some(fps)
    }

    /// Average of the last completed window.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..15 {
            assert_eq!(fps.record(0.0625), None);
        }
        let avg = fps.record(0.0625).unwrap();
        assert!((avg - 16.0).abs() < 1e-9);
        assert_eq!(fps.current(), Some(avg));
        assert_eq!(fps.record(0.0625), None);
    }
}
