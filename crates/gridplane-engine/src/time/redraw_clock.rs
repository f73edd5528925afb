use std::time::{Duration, Instant};

/// Snapshot handed to one redraw.
#[derive(Debug, Copy, Clone)]
pub struct FrameTick {
    /// Time elapsed since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Fixed-period redraw schedule.
///
/// The runtime waits until `deadline()`, requests a redraw once `is_due`, and
/// calls `tick` from the redraw itself; `tick` re-arms the deadline one period
/// after the redraw, not after the previous deadline, so a slow frame delays
/// the next one instead of queuing a burst.
///
/// Animation driven from `tick` advances once per redraw, not per unit of
/// wall-clock time.
#[derive(Debug, Clone)]
pub struct RedrawClock {
    period: Duration,
    deadline: Instant,
    last: Option<Instant>,
    frame_index: u64,
}

impl RedrawClock {
    /// Period used by the grid viewer.
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(30);

    /// Creates a clock whose first redraw is due immediately.
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    /// Creates a clock whose first redraw is due at `start`.
    pub fn starting_at(period: Duration, start: Instant) -> Self {
        debug_assert!(!period.is_zero());
        Self {
            period,
            deadline: start,
            last: None,
            frame_index: 0,
        }
    }

    /// Instant at which the next redraw should be requested.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the next redraw is due at `now`.
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Records a redraw at `now` and re-arms the deadline.
    pub fn tick(&mut self, now: Instant) -> FrameTick {
        let dt = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));

        self.last = Some(now);
        self.deadline = now + self.period;

        let tick = FrameTick {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        tick
    }
}
