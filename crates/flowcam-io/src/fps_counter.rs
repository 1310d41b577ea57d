use std::time::{Duration, Instant};

/// The smoothing factor for the FPS calculation.
const SMOOTHING: f32 = 0.95;

/// A frame per second (FPS) counter with exponential smoothing.
///
/// # Examples
///
/// ```
/// use flowcam_io::fps_counter::FpsCounter;
///
/// let mut fps_counter = FpsCounter::new();
///
/// for _ in 0..10 {
///    fps_counter.update();
/// }
///
/// assert_eq!(fps_counter.frame_count(), 10);
/// ```
pub struct FpsCounter {
    start_time: Instant,
    last_time: Instant,
    frame_count: u64,
    fps: f32,
}

impl FpsCounter {
    /// Creates a new `FpsCounter`.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_time: now,
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Returns the current smoothed FPS.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Returns the number of frames counted so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the time elapsed since the counter was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Counts a new frame and returns the updated FPS.
    pub fn update(&mut self) -> f32 {
        self.frame_count += 1;

        let now = Instant::now();
        let secs = now.duration_since(self.last_time).as_secs_f32();
        self.last_time = now;

        // two frames in the same clock tick carry no rate information
        if secs <= f32::EPSILON {
            return self.fps;
        }

        let instant_fps = 1.0 / secs;
        self.fps = if self.fps == 0.0 {
            instant_fps
        } else {
            self.fps * SMOOTHING + instant_fps * (1.0 - SMOOTHING)
        };
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::FpsCounter;

    #[test]
    fn test_fps_counter() {
        let mut fps_counter = FpsCounter::new();
        assert_eq!(fps_counter.fps(), 0.0);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let fps = fps_counter.update();
        assert!(fps > 0.0 && fps.is_finite());

        fps_counter.update();
        fps_counter.update();
        assert_eq!(fps_counter.frame_count(), 3);
        assert!(fps_counter.elapsed() >= std::time::Duration::from_millis(5));
    }
}
