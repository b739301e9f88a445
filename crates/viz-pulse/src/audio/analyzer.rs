//! Per-tick control signal extraction.
//!
//! Turns one byte magnitude spectrum into a bounded [`ControlSignal`]:
//! band aggregation, automatic gain, transient detection, then shaping.

use viz_pulse_api::ControlSignal;

use super::bands::{self, BandPartition};
use super::gain::GainState;
use super::shaping;
use super::transient::TransientMemory;

/// Mutable analysis state of one capture session.
///
/// Owned by the caller and threaded through each [`tick`](Self::tick), so
/// independent sessions never share loudness history.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    partition: BandPartition,
    gain: GainState,
    memory: TransientMemory,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::with_partition(BandPartition::REFERENCE)
    }

    pub fn with_partition(partition: BandPartition) -> Self {
        Self {
            partition,
            gain: GainState::new(),
            memory: TransientMemory::new(),
        }
    }

    /// Analyse one spectrum. Pure arithmetic over bounded input; cannot fail.
    pub fn tick(&mut self, spectrum: &[u8]) -> ControlSignal {
        let raw = bands::aggregate(spectrum, &self.partition);
        let normalized = self.gain.normalize(&raw);
        let transients = self.memory.detect(&normalized);

        let levels = shaping::levels(&normalized);
        let onsets = shaping::onsets(&transients);

        ControlSignal {
            frequency_data: spectrum.to_vec(),
            average_frequency: levels.average_frequency,
            bass: levels.bass,
            mid: levels.mid,
            treble: levels.treble,
            kick: onsets.kick,
            snare: onsets.snare,
            hihat: onsets.hihat,
            impact: onsets.impact,
        }
    }

    /// Forget loudness and onset history
    pub fn reset(&mut self) {
        self.gain.reset();
        self.memory.reset();
    }

    pub fn set_partition(&mut self, partition: BandPartition) {
        self.partition = partition;
    }

    pub fn partition(&self) -> &BandPartition {
        &self.partition
    }

    pub fn gain(&self) -> &GainState {
        &self.gain
    }

    pub fn memory(&self) -> &TransientMemory {
        &self.memory
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new()
    }
}
