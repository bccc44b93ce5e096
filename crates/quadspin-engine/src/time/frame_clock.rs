use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces the `dt` handed to `RenderSession::update`.
///
/// Delta time is clamped so a debugger stop or a minimized window does not
/// spin the quad through several turns in one frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock clamping `dt` to `[100 µs, 250 ms]`.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline so the next tick measures from now.
    ///
    /// Called when resuming from pause; the paused interval is not reported.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
