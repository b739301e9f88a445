//! Byte magnitude spectrum from raw samples.
//!
//! Mirrors the behaviour of a browser-style analyser node: Blackman window,
//! time smoothing between frames, and a linear map of a decibel range onto
//! 0-255. The analysis core only ever sees the bytes.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Transform size; at 44.1 kHz this gives ~21.5 Hz bins
pub const FFT_SIZE: usize = 2048;

/// Analyser tuning, usually taken from the config file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSettings {
    /// Weight of the previous frame's magnitude (0 = none, <1)
    pub smoothing: f32,
    /// Level mapped to byte 0
    pub min_decibels: f32,
    /// Level mapped to byte 255
    pub max_decibels: f32,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.3,
            min_decibels: -90.0,
            max_decibels: -10.0,
        }
    }
}

impl SpectrumSettings {
    /// Clamp values into a usable range
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let smoothing = if self.smoothing.is_finite() {
            self.smoothing.clamp(0.0, 0.99)
        } else {
            defaults.smoothing
        };
        let (min_decibels, max_decibels) = if self.min_decibels.is_finite()
            && self.max_decibels.is_finite()
            && self.min_decibels < self.max_decibels
        {
            (self.min_decibels, self.max_decibels)
        } else {
            (defaults.min_decibels, defaults.max_decibels)
        };
        Self {
            smoothing,
            min_decibels,
            max_decibels,
        }
    }
}

pub struct SpectrumAnalyser {
    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_window: Vec<f32>,

    settings: SpectrumSettings,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(settings: SpectrumSettings) -> Self {
        Self::with_size(FFT_SIZE, settings)
    }

    pub fn with_size(fft_size: usize, settings: SpectrumSettings) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Periodic Blackman window, alpha = 0.16
        let fft_window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let x = 2.0 * std::f32::consts::PI * i as f32 / fft_size as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        let bins = fft_size / 2;
        Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            fft_window,
            settings: settings.sanitized(),
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_buffer.len()
    }

    /// Number of magnitude bins produced per frame
    pub fn bins(&self) -> usize {
        self.bytes.len()
    }

    /// Transform one frame of mono samples into bytes.
    ///
    /// Takes the first `fft_size` samples; shorter input is zero padded.
    pub fn process(&mut self, samples: &[f32]) -> &[u8] {
        let fft_size = self.fft_buffer.len();

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = samples.get(i).copied().filter(|s| s.is_finite()).unwrap_or(0.0);
            *slot = Complex::new(sample * self.fft_window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let SpectrumSettings {
            smoothing,
            min_decibels,
            max_decibels,
        } = self.settings;
        let range = max_decibels - min_decibels;

        for (k, byte) in self.bytes.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() / fft_size as f32;
            let smoothed = smoothing * self.smoothed[k] + (1.0 - smoothing) * magnitude;
            self.smoothed[k] = smoothed;

            *byte = if smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (255.0 / range * (db - min_decibels)).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }

        &self.bytes
    }

    /// Drop smoothing memory so the next frame starts fresh
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_at_bin(bin: usize, amplitude: f32) -> Vec<f32> {
        (0..FFT_SIZE)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_silence_maps_to_zero() {
        let mut analyser = SpectrumAnalyser::new(SpectrumSettings::default());
        let bytes = analyser.process(&vec![0.0; FFT_SIZE]);
        assert_eq!(bytes.len(), FFT_SIZE / 2);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = SpectrumAnalyser::new(SpectrumSettings::default());
        let bytes = analyser.process(&sine_at_bin(40, 1.0)).to_vec();

        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 40);
        assert!(bytes[40] > 200, "peak byte {}", bytes[40]);
        assert!(bytes[60] < 16, "leakage byte {}", bytes[60]);
    }

    #[test]
    fn test_smoothing_holds_energy_after_signal_stops() {
        let mut analyser = SpectrumAnalyser::new(SpectrumSettings::default());
        analyser.process(&sine_at_bin(40, 1.0));
        let after = analyser.process(&vec![0.0; FFT_SIZE])[40];
        assert!(after > 0);

        analyser.reset();
        assert_eq!(analyser.process(&vec![0.0; FFT_SIZE])[40], 0);
    }

    #[test]
    fn test_short_and_non_finite_input() {
        let mut analyser = SpectrumAnalyser::new(SpectrumSettings::default());
        assert!(analyser.process(&[]).iter().all(|&b| b == 0));
        assert!(analyser.process(&[f32::NAN; 16]).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_settings_sanitized() {
        let settings = SpectrumSettings {
            smoothing: 4.0,
            min_decibels: -10.0,
            max_decibels: -90.0,
        }
        .sanitized();
        assert_eq!(settings.smoothing, 0.99);
        assert_eq!(settings.min_decibels, -90.0);
        assert_eq!(settings.max_decibels, -10.0);
    }
}
