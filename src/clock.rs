use std::time::{Duration, Instant};

/// Paces the host loop: one frame per interval, however many input events arrive
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    interval: Duration,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_frame: now,
        }
    }

    /// Time left before the next frame is due
    pub fn until_next(&self, now: Instant) -> Duration {
        self.interval.saturating_sub(now.saturating_duration_since(self.last_frame))
    }

    /// Claim the frame if it is due.
    ///
    /// A late frame restarts the interval from `now`; missed frames are not
    /// replayed, so a stalled loop never runs a burst of catch-up ticks.
    pub fn frame_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_frame) < self.interval {
            return false;
        }
        self.last_frame = now;
        true
    }
}
