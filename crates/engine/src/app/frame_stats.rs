use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameStatsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub dropped_ticks: u32,
}

/// Counts frames and simulation ticks over a fixed reporting window.
#[derive(Debug)]
pub(crate) struct FrameStats {
    window_start: Instant,
    window: Duration,
    frames: u32,
    ticks: u32,
    dropped_ticks: u32,
    frame_time_sum: Duration,
}

impl FrameStats {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window_start: now,
            window,
            frames: 0,
            ticks: 0,
            dropped_ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn record_dropped_backlog(&mut self, dropped: Duration, fixed_dt: Duration) {
        if fixed_dt.is_zero() {
            return;
        }
        let ticks = (dropped.as_secs_f64() / fixed_dt.as_secs_f64()).floor() as u32;
        self.dropped_ticks = self.dropped_ticks.saturating_add(ticks);
    }

    /// Closes the window and returns its rates once `window` has elapsed.
    pub(crate) fn take_if_due(&mut self, now: Instant) -> Option<FrameStatsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() / self.frames as f32 * 1000.0
        };
        let snapshot = FrameStatsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            dropped_ticks: self.dropped_ticks,
        };

        self.window_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.dropped_ticks = 0;
        self.frame_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_computed_over_the_window() {
        let base = Instant::now();
        let mut stats = FrameStats::new(Duration::from_secs(2), base);
        for _ in 0..4 {
            stats.record_frame(Duration::from_millis(20));
        }
        for _ in 0..6 {
            stats.record_tick();
        }

        let snapshot = stats
            .take_if_due(base + Duration::from_secs(2))
            .expect("window elapsed");
        assert!((snapshot.fps - 2.0).abs() < 0.01);
        assert!((snapshot.tps - 3.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);
    }

    #[test]
    fn nothing_reported_before_window_elapses() {
        let base = Instant::now();
        let mut stats = FrameStats::new(Duration::from_secs(1), base);
        stats.record_frame(Duration::from_millis(16));
        assert!(stats
            .take_if_due(base + Duration::from_millis(999))
            .is_none());
    }

    #[test]
    fn counters_reset_after_report() {
        let base = Instant::now();
        let mut stats = FrameStats::new(Duration::from_secs(1), base);
        stats.record_tick();
        stats.record_dropped_backlog(Duration::from_millis(50), Duration::from_millis(16));
        let first = stats
            .take_if_due(base + Duration::from_secs(1))
            .expect("first");
        assert_eq!(first.dropped_ticks, 3);

        let second = stats
            .take_if_due(base + Duration::from_secs(2))
            .expect("second");
        assert_eq!(second.tps, 0.0);
        assert_eq!(second.dropped_ticks, 0);
    }
}
