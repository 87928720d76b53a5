//! Frame timing for the scene loop.
//!
//! With a live backend the elapsed time comes from the backend clock; when
//! running headless there is nothing to measure and every frame advances by
//! exactly `1 / fps`.

const FPS_SAMPLE_COUNT: usize = 60;

#[derive(Debug, Clone)]
pub struct FrameClock {
    pub fps: u32,
    pub fixed_dt: f64,
    /// Upper bound on a single measured frame, in seconds.
    pub max_dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    pub last_dt: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        let fixed_dt = 1.0 / f64::from(fps);
        Self {
            fps,
            fixed_dt,
            max_dt: 0.25,
            total_time: 0.0,
            frame_count: 0,
            last_dt: 0.0,
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: f64::from(fps),
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    /// Record one frame. `measured` is the backend's elapsed time, `None` when
    /// headless. Returns the dt the simulation should use.
    pub fn advance(&mut self, measured: Option<f64>) -> f64 {
        let mut dt = match measured {
            Some(measured) if measured.is_finite() && measured >= 0.0 => measured,
            Some(measured) => {
                log::warn!("Ignoring invalid frame time {measured}; using fixed step");
                self.fixed_dt
            }
            None => self.fixed_dt,
        };

        // Spiral-of-death cap
        if dt > self.max_dt {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                dt * 1000.0,
                self.max_dt * 1000.0
            );
            dt = self.max_dt;
        }

        self.last_dt = dt;
        self.total_time += dt;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}
