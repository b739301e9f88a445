//! Onset detection against a decayed memory of each band.
//!
//! A band registers a transient only when it rises above a fraction of what it
//! recently was. The memory itself follows at a moderate pace so that a run of
//! loud frames does not immediately suppress detection.

use super::bands::BandLevels;

/// Weight of the old memory when folding in a new frame
const MEMORY_RETAIN: f32 = 0.4;

const KICK_DECAY: f32 = 0.6;
const SNARE_DECAY: f32 = 0.5;
const HIHAT_DECAY: f32 = 0.4;
const IMPACT_DECAY: f32 = 0.5;

/// Raw transient strength per onset proxy, before noise floor and scaling
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Onsets {
    /// Kick band
    pub kick: f32,
    /// Mid band
    pub snare: f32,
    /// Treble band
    pub hihat: f32,
    /// Full spectrum
    pub impact: f32,
}

/// Decayed memory of the gain-corrected bands
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransientMemory {
    kick: f32,
    mid: f32,
    treble: f32,
    energy: f32,
}

impl TransientMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `levels` with the memory, then fold them in
    pub fn detect(&mut self, levels: &BandLevels) -> Onsets {
        let onsets = Onsets {
            kick: rise(levels.kick, self.kick, KICK_DECAY),
            snare: rise(levels.mid, self.mid, SNARE_DECAY),
            hihat: rise(levels.treble, self.treble, HIHAT_DECAY),
            impact: rise(levels.energy, self.energy, IMPACT_DECAY),
        };

        remember(&mut self.kick, levels.kick);
        remember(&mut self.mid, levels.mid);
        remember(&mut self.treble, levels.treble);
        remember(&mut self.energy, levels.energy);

        onsets
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn rise(current: f32, memory: f32, decay: f32) -> f32 {
    (current - memory * decay).max(0.0)
}

fn remember(memory: &mut f32, current: f32) {
    *memory = *memory * MEMORY_RETAIN + current * (1.0 - MEMORY_RETAIN);
}
