//! Published control signal snapshot

use serde::{Deserialize, Serialize};

/// Number of magnitude bins in a spectrum from a 2048-point transform
pub const SPECTRUM_SIZE: usize = 1024;

/// Upper bound of every numeric field in a [`ControlSignal`].
///
/// The renderer relies on these to keep animation amplitude bounded no matter
/// how loud the source is. No field is ever below zero.
pub mod ceiling {
    pub const AVERAGE_FREQUENCY: f32 = 0.5;
    pub const BASS: f32 = 0.4;
    pub const MID: f32 = 0.35;
    pub const TREBLE: f32 = 0.3;
    pub const KICK: f32 = 0.5;
    pub const SNARE: f32 = 0.45;
    pub const HIHAT: f32 = 0.35;
    pub const IMPACT: f32 = 0.45;
}

/// One analysis tick worth of control values.
///
/// Snapshots are built completely before publication and never mutated
/// afterwards, so a consumer holding one always sees a consistent frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSignal {
    /// Byte magnitude spectrum the values were derived from (0-255 per bin)
    pub frequency_data: Vec<u8>,
    /// Gain-corrected overall energy
    pub average_frequency: f32,
    /// Smoothed low band level (kick + bass bins)
    pub bass: f32,
    /// Smoothed mid band level
    pub mid: f32,
    /// Smoothed high band level
    pub treble: f32,
    /// Onset strength in the kick band
    pub kick: f32,
    /// Onset strength in the mid band
    pub snare: f32,
    /// Onset strength in the treble band
    pub hihat: f32,
    /// Onset strength of the whole spectrum
    pub impact: f32,
}

impl ControlSignal {
    /// Zeroed snapshot with `bins` silent spectrum bins
    pub fn silent(bins: usize) -> Self {
        Self {
            frequency_data: vec![0; bins],
            average_frequency: 0.0,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
            kick: 0.0,
            snare: 0.0,
            hihat: 0.0,
            impact: 0.0,
        }
    }

    /// Numeric fields paired with their names and ceilings
    pub fn levels(&self) -> [(&'static str, f32, f32); 8] {
        [
            ("averageFrequency", self.average_frequency, ceiling::AVERAGE_FREQUENCY),
            ("bass", self.bass, ceiling::BASS),
            ("mid", self.mid, ceiling::MID),
            ("treble", self.treble, ceiling::TREBLE),
            ("kick", self.kick, ceiling::KICK),
            ("snare", self.snare, ceiling::SNARE),
            ("hihat", self.hihat, ceiling::HIHAT),
            ("impact", self.impact, ceiling::IMPACT),
        ]
    }

    /// Whether every numeric field lies in `[0, ceiling]`
    pub fn is_within_ceilings(&self) -> bool {
        self.levels()
            .iter()
            .all(|&(_, value, max)| (0.0..=max).contains(&value))
    }
}

impl Default for ControlSignal {
    fn default() -> Self {
        Self::silent(SPECTRUM_SIZE)
    }
}
