//! Automatic gain control.
//!
//! Tracks overall loudness with a slow average and a peak-hold envelope and
//! derives one gain multiplier that brings quiet and loud material to
//! comparable levels.

use super::bands::BandLevels;

const INITIAL_AVG_LEVEL: f32 = 0.1;
const INITIAL_PEAK_LEVEL: f32 = 0.3;

/// Lower bound of the average tracker
pub const AVG_LEVEL_FLOOR: f32 = 0.08;
/// Lower bound of the peak tracker
pub const PEAK_LEVEL_FLOOR: f32 = 0.15;

/// ~200 tick time constant
const AVG_RETAIN: f32 = 0.995;
/// ~1000 tick release once the peak has been passed
const PEAK_RETAIN: f32 = 0.999;

const TARGET_AVG: f32 = 0.2;
const TARGET_PEAK: f32 = 0.8;
/// Hard ceiling so silence is never amplified without bound
pub const MAX_GAIN: f32 = 3.5;

/// Loudness trackers of one capture session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainState {
    avg_level: f32,
    peak_level: f32,
}

impl GainState {
    pub fn new() -> Self {
        Self {
            avg_level: INITIAL_AVG_LEVEL,
            peak_level: INITIAL_PEAK_LEVEL,
        }
    }

    /// Feed one tick of raw full-spectrum energy and return the gain to apply
    pub fn update(&mut self, raw_energy: f32) -> f32 {
        let raw_energy = if raw_energy.is_finite() {
            raw_energy.max(0.0)
        } else {
            0.0
        };

        self.avg_level = self.avg_level * AVG_RETAIN + raw_energy * (1.0 - AVG_RETAIN);

        if raw_energy > self.peak_level {
            self.peak_level = raw_energy;
        } else {
            self.peak_level = self.peak_level * PEAK_RETAIN + raw_energy * (1.0 - PEAK_RETAIN);
        }

        self.avg_level = self.avg_level.max(AVG_LEVEL_FLOOR);
        self.peak_level = self.peak_level.max(PEAK_LEVEL_FLOOR);

        self.gain()
    }

    /// Gain implied by the current trackers
    pub fn gain(&self) -> f32 {
        let dynamic_gain = TARGET_AVG / self.avg_level;
        let gain_cap = TARGET_PEAK / self.peak_level;
        dynamic_gain.min(gain_cap).min(MAX_GAIN)
    }

    /// Update from `raw` and return the gain-corrected levels
    pub fn normalize(&mut self, raw: &BandLevels) -> BandLevels {
        let gain = self.update(raw.energy);
        raw.scaled(gain)
    }

    pub fn avg_level(&self) -> f32 {
        self.avg_level
    }

    pub fn peak_level(&self) -> f32 {
        self.peak_level
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GainState {
    fn default() -> Self {
        Self::new()
    }
}
