//! Recorder configuration.

/// Tuning knobs for a recording session.
///
/// # Examples
///
/// ```
/// use gourd_recorder::RecorderConfig;
///
/// let config = RecorderConfig {
///     keyframe_interval: 0.5,
///     ..Default::default()
/// };
/// assert_eq!(config.quantize_decimals, 3);
/// ```
#[derive(Clone, Debug)]
pub struct RecorderConfig {
    /// Capacity of the recorder→writer channel. A full channel drops
    /// records rather than blocking the tick. Default: 1024.
    pub queue_capacity: usize,
    /// Seconds between periodic keyframes. Default: 0.2.
    pub keyframe_interval: f64,
    /// Seconds to wait before the first keyframe, so late-initializing
    /// entities are not recorded as a spurious first frame. Default: 0.1.
    pub warmup: f64,
    /// Minimum displacement (world units) since an entity's last
    /// recorded position for it to appear in a keyframe. Default: 0.25.
    pub motion_threshold: f64,
    /// Decimal places kept when quantizing numeric values. Default: 3.
    pub quantize_decimals: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            keyframe_interval: 0.2,
            warmup: 0.1,
            motion_threshold: 0.25,
            quantize_decimals: 3,
        }
    }
}

impl RecorderConfig {
    /// Clamp obviously unusable values instead of erroring: a zero
    /// capacity channel would drop everything, a negative interval
    /// would keyframe every tick.
    pub fn sanitized(mut self) -> Self {
        self.queue_capacity = self.queue_capacity.max(1);
        self.keyframe_interval = self.keyframe_interval.max(0.0);
        self.warmup = self.warmup.max(0.0);
        self.motion_threshold = self.motion_threshold.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_degenerate_values() {
        let config = RecorderConfig {
            queue_capacity: 0,
            keyframe_interval: -1.0,
            warmup: -0.5,
            motion_threshold: -2.0,
            quantize_decimals: 3,
        }
        .sanitized();
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.keyframe_interval, 0.0);
        assert_eq!(config.warmup, 0.0);
        assert_eq!(config.motion_threshold, 0.0);
    }
}
