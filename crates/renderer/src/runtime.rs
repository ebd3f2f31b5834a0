use std::time::Instant;

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames should animate continuously or
/// whether a single frame should be evaluated at a fixed timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Render a single still frame at an optional timestamp.
    Still {
        /// Specific timestamp to evaluate the demo at (seconds).
        time: Option<f32>,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Snapshot of the time state supplied to a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or fixed time in seconds.
    pub seconds: f32,
    /// Seconds since the previous sample.
    pub delta_seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

/// Abstraction over where frame time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    last: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        let now = Instant::now();
        self.origin = now;
        self.last = now;
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let now = Instant::now();
        let sample = TimeSample {
            seconds: now.duration_since(self.origin).as_secs_f32(),
            delta_seconds: now.duration_since(self.last).as_secs_f32(),
            frame_index: self.frame,
        };
        self.last = now;
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {}

    fn sample(&mut self) -> TimeSample {
        TimeSample {
            seconds: self.time,
            delta_seconds: 0.0,
            frame_index: 0,
        }
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(time.unwrap_or(0.0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_source_counts_frames() {
        let mut source = SystemTimeSource::new();
        assert_eq!(source.sample().frame_index, 0);
        assert_eq!(source.sample().frame_index, 1);
        source.reset();
        assert_eq!(source.sample().frame_index, 0);
    }

    #[test]
    fn fixed_source_pins_time_and_frame() {
        let mut source = FixedTimeSource::new(4.5);
        let first = source.sample();
        let second = source.sample();
        assert_eq!(first, second);
        assert_eq!(first.seconds, 4.5);
        assert_eq!(first.frame_index, 0);
    }

    #[test]
    fn policy_selects_matching_source() {
        let mut still = time_source_for_policy(&RenderPolicy::Still { time: Some(2.0) });
        assert_eq!(still.sample().seconds, 2.0);
        let mut animate = time_source_for_policy(&RenderPolicy::default());
        assert_eq!(animate.sample().frame_index, 0);
    }
}
