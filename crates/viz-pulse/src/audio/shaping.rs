//! Final scaling and clamping of levels and onsets.
//!
//! Every value leaving this module lies in `[0, ceiling]` for its field, even if
//! the input carries NaN or runaway values.

use viz_pulse_api::ceiling;

use super::bands::BandLevels;
use super::transient::Onsets;

/// Linear scale followed by a hard ceiling
#[derive(Debug, Clone, Copy)]
struct LevelShape {
    scale: f32,
    ceiling: f32,
}

const BASS: LevelShape = LevelShape {
    scale: 0.7,
    ceiling: ceiling::BASS,
};
const MID: LevelShape = LevelShape {
    scale: 0.6,
    ceiling: ceiling::MID,
};
const TREBLE: LevelShape = LevelShape {
    scale: 0.5,
    ceiling: ceiling::TREBLE,
};
const AVERAGE: LevelShape = LevelShape {
    scale: 1.0,
    ceiling: ceiling::AVERAGE_FREQUENCY,
};

/// Noise floor, gain and ceiling of one onset proxy
#[derive(Debug, Clone, Copy)]
struct OnsetShape {
    bias: f32,
    scale: f32,
    ceiling: f32,
}

const KICK: OnsetShape = OnsetShape {
    bias: 0.08,
    scale: 3.0,
    ceiling: ceiling::KICK,
};
const SNARE: OnsetShape = OnsetShape {
    bias: 0.06,
    scale: 2.5,
    ceiling: ceiling::SNARE,
};
const HIHAT: OnsetShape = OnsetShape {
    bias: 0.05,
    scale: 2.0,
    ceiling: ceiling::HIHAT,
};
const IMPACT: OnsetShape = OnsetShape {
    bias: 0.06,
    scale: 2.0,
    ceiling: ceiling::IMPACT,
};

/// Output level fields of a control signal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapedLevels {
    pub average_frequency: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

pub fn levels(normalized: &BandLevels) -> ShapedLevels {
    ShapedLevels {
        average_frequency: bounded(normalized.energy * AVERAGE.scale, AVERAGE.ceiling),
        bass: bounded(normalized.bass * BASS.scale, BASS.ceiling),
        mid: bounded(normalized.mid * MID.scale, MID.ceiling),
        treble: bounded(normalized.treble * TREBLE.scale, TREBLE.ceiling),
    }
}

pub fn onsets(raw: &Onsets) -> Onsets {
    Onsets {
        kick: onset(raw.kick, &KICK),
        snare: onset(raw.snare, &SNARE),
        hihat: onset(raw.hihat, &HIHAT),
        impact: onset(raw.impact, &IMPACT),
    }
}

fn onset(transient: f32, shape: &OnsetShape) -> f32 {
    let above_floor = (transient - shape.bias).max(0.0);
    bounded(above_floor * shape.scale, shape.ceiling)
}

fn bounded(value: f32, ceiling: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, ceiling)
}
