//! Spectral band aggregation.
//!
//! Splits one byte magnitude spectrum into fixed kick/bass/mid/treble ranges and
//! reduces each to a ratio in `[0, 1]` of its full-scale sum.

use super::error::PartitionError;

/// Sample rate the reference partition was laid out for
pub const REFERENCE_SAMPLE_RATE: f32 = 44_100.0;

/// Transform size the reference partition was laid out for
pub const REFERENCE_FFT_SIZE: usize = 2048;

/// Width of one bin of the reference transform (~21.5 Hz)
pub const REFERENCE_BIN_WIDTH_HZ: f32 = REFERENCE_SAMPLE_RATE / REFERENCE_FFT_SIZE as f32;

const FULL_SCALE: f32 = 255.0;

/// Bin boundaries of the named bands.
///
/// kick `[0, kick_end)`, bass `[0, bass_end)` (kick included),
/// mid `[bass_end, mid_end)`, treble `[mid_end, treble_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPartition {
    kick_end: usize,
    bass_end: usize,
    mid_end: usize,
    treble_end: usize,
}

impl BandPartition {
    /// Reference layout at [`REFERENCE_BIN_WIDTH_HZ`]:
    /// kick 0-172 Hz, bass 172-344 Hz, mid 344-2153 Hz, treble 2153-8613 Hz
    pub const REFERENCE: BandPartition = BandPartition {
        kick_end: 8,
        bass_end: 16,
        mid_end: 100,
        treble_end: 400,
    };

    /// Build a partition for a spectrum of `bins` bins
    pub fn new(
        kick_end: usize,
        bass_end: usize,
        mid_end: usize,
        treble_end: usize,
        bins: usize,
    ) -> Result<Self, PartitionError> {
        let partition = Self {
            kick_end,
            bass_end,
            mid_end,
            treble_end,
        };
        partition.validate(bins)?;
        Ok(partition)
    }

    /// Check that boundaries increase strictly and fit in `bins`
    pub fn validate(&self, bins: usize) -> Result<(), PartitionError> {
        let edges = [0, self.kick_end, self.bass_end, self.mid_end, self.treble_end];
        if let Some(pair) = edges.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PartitionError::InvalidBandPartition {
                reason: format!(
                    "boundaries must increase strictly, got {} then {}",
                    pair[0], pair[1]
                ),
            });
        }
        if self.treble_end > bins {
            return Err(PartitionError::InvalidBandPartition {
                reason: format!(
                    "treble ends at bin {} but the spectrum has {} bins",
                    self.treble_end, bins
                ),
            });
        }
        Ok(())
    }

    /// Map the reference edges onto a transform with a different bin width
    pub fn rescaled(sample_rate: f32, fft_size: usize) -> Result<Self, PartitionError> {
        if sample_rate <= 0.0 || fft_size < 2 {
            return Err(PartitionError::InvalidBandPartition {
                reason: format!("cannot rescale to {sample_rate} Hz / {fft_size} points"),
            });
        }
        let bin_width = sample_rate / fft_size as f32;
        let bins = fft_size / 2;
        let reference = Self::REFERENCE;

        // Each edge keeps its frequency; rounding may not collapse a band
        let mut previous = 0;
        let mut edges = [
            reference.kick_end,
            reference.bass_end,
            reference.mid_end,
            reference.treble_end,
        ]
        .map(|bin| {
            let hz = bin as f32 * REFERENCE_BIN_WIDTH_HZ;
            let mapped = ((hz / bin_width).round() as usize).max(previous + 1);
            previous = mapped;
            mapped
        });

        // Edges past Nyquist stack up below the last bin
        let mut limit = bins;
        for edge in edges.iter_mut().rev() {
            *edge = (*edge).min(limit);
            limit = edge.saturating_sub(1);
        }

        let [kick_end, bass_end, mid_end, treble_end] = edges;
        Self::new(kick_end, bass_end, mid_end, treble_end, bins)
    }

    pub fn kick_end(&self) -> usize {
        self.kick_end
    }

    pub fn bass_end(&self) -> usize {
        self.bass_end
    }

    pub fn mid_end(&self) -> usize {
        self.mid_end
    }

    pub fn treble_end(&self) -> usize {
        self.treble_end
    }
}

impl Default for BandPartition {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Per-band energy ratios for one tick.
///
/// Raw out of [`aggregate`], gain-corrected after [`BandLevels::scaled`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandLevels {
    pub kick: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub energy: f32,
}

impl BandLevels {
    pub fn scaled(&self, gain: f32) -> Self {
        Self {
            kick: self.kick * gain,
            bass: self.bass * gain,
            mid: self.mid * gain,
            treble: self.treble * gain,
            energy: self.energy * gain,
        }
    }
}

/// Sum each band of `spectrum` and normalise by band width and full scale.
///
/// Bins past `treble_end` only count toward `energy`. Missing bins of a short
/// spectrum count as silence.
pub fn aggregate(spectrum: &[u8], partition: &BandPartition) -> BandLevels {
    let mut kick_sum = 0u32;
    let mut bass_sum = 0u32;
    let mut mid_sum = 0u32;
    let mut treble_sum = 0u32;
    let mut total = 0u32;

    for (i, &value) in spectrum.iter().enumerate() {
        let value = value as u32;
        total += value;

        if i < partition.kick_end {
            kick_sum += value;
        } else if i < partition.bass_end {
            bass_sum += value;
        } else if i < partition.mid_end {
            mid_sum += value;
        } else if i < partition.treble_end {
            treble_sum += value;
        }
    }

    let ratio = |sum: u32, width: usize| sum as f32 / width as f32 / FULL_SCALE;

    BandLevels {
        kick: ratio(kick_sum, partition.kick_end),
        bass: ratio(kick_sum + bass_sum, partition.bass_end),
        mid: ratio(mid_sum, partition.mid_end - partition.bass_end),
        treble: ratio(treble_sum, partition.treble_end - partition.mid_end),
        energy: if spectrum.is_empty() {
            0.0
        } else {
            ratio(total, spectrum.len())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_partition_is_valid() {
        assert!(BandPartition::REFERENCE.validate(1024).is_ok());
        assert!(BandPartition::REFERENCE.validate(400).is_ok());
        assert!(BandPartition::REFERENCE.validate(399).is_err());
    }

    #[test]
    fn test_rejects_non_increasing_boundaries() {
        assert!(BandPartition::new(8, 8, 100, 400, 1024).is_err());
        assert!(BandPartition::new(0, 16, 100, 400, 1024).is_err());
        assert!(BandPartition::new(8, 16, 120, 100, 1024).is_err());
        assert!(BandPartition::new(8, 16, 100, 1025, 1024).is_err());
    }

    #[test]
    fn test_rescaled_reference_matches() {
        let same = BandPartition::rescaled(REFERENCE_SAMPLE_RATE, REFERENCE_FFT_SIZE).unwrap();
        assert_eq!(same, BandPartition::REFERENCE);
    }

    #[test]
    fn test_rescaled_to_48k() {
        // 48 kHz / 2048 = 23.4 Hz bins, so every edge moves down a little
        let p = BandPartition::rescaled(48_000.0, 2048).unwrap();
        assert_eq!(p.kick_end(), 7);
        assert_eq!(p.bass_end(), 15);
        assert_eq!(p.mid_end(), 92);
        assert_eq!(p.treble_end(), 368);
    }

    #[test]
    fn test_rescaled_keeps_bands_distinct_on_coarse_transforms() {
        let p = BandPartition::rescaled(44_100.0, 64).unwrap();
        assert!(p.kick_end() < p.bass_end());
        assert!(p.bass_end() < p.mid_end());
        assert!(p.mid_end() < p.treble_end());
        assert!(BandPartition::rescaled(0.0, 2048).is_err());
    }

    #[test]
    fn test_rescaled_below_treble_nyquist() {
        // 16 kHz: treble would end at 8.6 kHz, past the 8 kHz Nyquist
        let p = BandPartition::rescaled(16_000.0, 2048).unwrap();
        assert_eq!(p.kick_end(), 22);
        assert_eq!(p.bass_end(), 44);
        assert_eq!(p.mid_end(), 276);
        assert_eq!(p.treble_end(), 1024);

        let p = BandPartition::rescaled(8_000.0, 2048).unwrap();
        assert_eq!(p.mid_end(), 551);
        assert_eq!(p.treble_end(), 1024);
    }

    #[test]
    fn test_rescaled_squeezes_into_tiny_transforms() {
        // 4 bins leave exactly one bin per band
        let p = BandPartition::rescaled(1_000.0, 8).unwrap();
        assert_eq!(
            [p.kick_end(), p.bass_end(), p.mid_end(), p.treble_end()],
            [1, 2, 3, 4]
        );
        assert!(BandPartition::rescaled(1_000.0, 6).is_err());
    }

    #[test]
    fn test_aggregate_kick_only() {
        let mut spectrum = vec![0u8; 400];
        spectrum[..8].fill(255);

        let levels = aggregate(&spectrum, &BandPartition::REFERENCE);
        assert_eq!(levels.kick, 1.0);
        assert_eq!(levels.bass, 0.5);
        assert_eq!(levels.mid, 0.0);
        assert_eq!(levels.treble, 0.0);
        assert!((levels.energy - 8.0 / 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_full_scale() {
        let spectrum = vec![255u8; 1024];
        let levels = aggregate(&spectrum, &BandPartition::REFERENCE);
        for value in [levels.kick, levels.bass, levels.mid, levels.treble, levels.energy] {
            assert!((value - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bins_past_treble_only_count_as_energy() {
        let mut spectrum = vec![0u8; 1024];
        spectrum[400..].fill(255);

        let levels = aggregate(&spectrum, &BandPartition::REFERENCE);
        assert_eq!(levels.treble, 0.0);
        assert!((levels.energy - 624.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_spectrum_is_silent() {
        let levels = aggregate(&[], &BandPartition::REFERENCE);
        assert_eq!(levels, BandLevels::default());
    }
}
