//! Pixel-per-second scale shared by every pixel/time conversion on the
//! timeline.

use crate::config::ZoomCfg;

pub const MIN_PIXELS_PER_SECOND: f64 = 20.0;
pub const MAX_PIXELS_PER_SECOND: f64 = 800.0;
pub const ZOOM_STEP: f64 = 1.5;
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 100.0;
/// Upper bound on ruler ticks produced for one timeline.
pub const MAX_TICKS: usize = 100_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Zoom {
    pixels_per_second: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(
            MIN_PIXELS_PER_SECOND,
            MAX_PIXELS_PER_SECOND,
            ZOOM_STEP,
            DEFAULT_PIXELS_PER_SECOND,
        )
    }
}

impl From<&ZoomCfg> for Zoom {
    fn from(cfg: &ZoomCfg) -> Self {
        Self::new(
            cfg.min_pixels_per_second,
            cfg.max_pixels_per_second,
            cfg.step,
            cfg.initial_pixels_per_second,
        )
    }
}

impl Zoom {
    /// A bad range (non-positive or inverted) falls back to the defaults.
    pub fn new(min: f64, max: f64, step: f64, initial: f64) -> Self {
        let (min, max) = if min > 0.0 && max >= min {
            (min, max)
        } else {
            tracing::warn!(min, max, "invalid zoom range, using defaults");
            (MIN_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND)
        };
        let step = if step > 1.0 { step } else { ZOOM_STEP };
        let initial = if initial.is_finite() {
            initial
        } else {
            DEFAULT_PIXELS_PER_SECOND
        };

        Self {
            pixels_per_second: initial.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn set(&mut self, pixels_per_second: f64) {
        if pixels_per_second.is_nan() {
            return;
        }
        self.pixels_per_second = pixels_per_second.clamp(self.min, self.max);
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set(self.pixels_per_second * self.step);
        self.pixels_per_second
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set(self.pixels_per_second / self.step);
        self.pixels_per_second
    }

    /// Ruler tick spacing in seconds.
    pub fn tick_interval(&self) -> f64 {
        if self.pixels_per_second > 100.0 {
            1.0
        } else if self.pixels_per_second > 50.0 {
            2.0
        } else {
            5.0
        }
    }

    pub fn time_to_px(&self, seconds: f64) -> f64 {
        seconds * self.pixels_per_second
    }

    pub fn px_to_time(&self, px: f64) -> f64 {
        px / self.pixels_per_second
    }

    /// Pointer movement in pixels as a drag delta in seconds.
    pub fn px_delta_to_seconds(&self, dx: f64) -> f64 {
        self.px_to_time(dx)
    }

    pub fn content_width(&self, duration: f64) -> f64 {
        self.time_to_px(duration.max(0.0))
    }

    /// Tick times from 0 up to and including `duration`, at most
    /// `MAX_TICKS + 1` of them.
    pub fn ticks(&self, duration: f64) -> Vec<f64> {
        if !duration.is_finite() {
            return vec![0.0];
        }
        let interval = self.tick_interval();
        let count = (duration.max(0.0) / interval)
            .floor()
            .min(MAX_TICKS as f64) as usize;
        (0..=count).map(|i| i as f64 * interval).collect()
    }
}
