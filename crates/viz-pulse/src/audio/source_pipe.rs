//! Microphone capture.
//!
//! Opens the default cpal input device, down-mixes whatever sample format it
//! delivers to mono f32, and keeps the newest window in a shared ring.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::time::Duration;
use tracing::{info, warn};
use viz_pulse_api::SourceKind;

use super::capture::{acquisition_error, CaptureSource};
use super::error::CaptureError;
use super::ring::{SampleRing, SharedRing};
use super::spectrum::FFT_SIZE;

pub struct MicSource {
    ring: SharedRing,
    sample_rate: u32,
    // Kept alive until the source is dropped
    _stream: Stream,
}

impl MicSource {
    pub fn open_default(timeout: Duration) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let (format, stream_config) = get_config_with_timeout(&device, true, timeout)?;
        let ring = SampleRing::shared(FFT_SIZE);

        let stream = match format {
            SampleFormat::F32 => build_input::<f32>(&device, &stream_config, ring.clone()),
            SampleFormat::I16 => build_input::<i16>(&device, &stream_config, ring.clone()),
            SampleFormat::U16 => build_input::<u16>(&device, &stream_config, ring.clone()),
            other => Err(CaptureError::DeviceUnavailable(format!(
                "unsupported input sample format {other:?}"
            ))),
        }?;

        stream.play().map_err(|e| acquisition_error(e.to_string()))?;

        info!(
            device = %name,
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            "microphone opened"
        );

        Ok(Self {
            ring,
            sample_rate: stream_config.sample_rate.0,
            _stream: stream,
        })
    }
}

impl CaptureSource for MicSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Microphone
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        self.ring.lock().copy_latest(out)
    }
}

/// Query a device's default config on a helper thread.
///
/// Some backends hang indefinitely on a bad device, so give up after `timeout`.
pub(crate) fn get_config_with_timeout(
    device: &Device,
    is_input: bool,
    timeout: Duration,
) -> Result<(SampleFormat, StreamConfig), CaptureError> {
    let device_clone = device.clone();
    let (tx, rx) = crossbeam_channel::bounded(1);

    std::thread::spawn(move || {
        let config = if is_input {
            device_clone.default_input_config()
        } else {
            device_clone.default_output_config()
        };
        let _ = tx.send(config.map_err(|e| e.to_string()));
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(config)) => Ok((config.sample_format(), config.config())),
        Ok(Err(message)) => Err(acquisition_error(message)),
        Err(_) => Err(CaptureError::DeviceUnavailable(format!(
            "device config timed out after {timeout:?}"
        ))),
    }
}

fn build_input<T>(
    device: &Device,
    config: &StreamConfig,
    ring: SharedRing,
) -> Result<Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let err_fn = |err| warn!("input stream error: {}", err);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut ring = ring.lock();
                for frame in data.chunks(channels.max(1)) {
                    let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                    ring.push(sum / frame.len() as f32);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| acquisition_error(e.to_string()))
}

/// Print every input and output device the default host exposes
pub fn list_devices() {
    let host = cpal::default_host();
    println!("\n=== Audio Devices ({}) ===", host.id().name());

    let default_input = host.default_input_device().and_then(|d| d.name().ok());
    let default_output = host.default_output_device().and_then(|d| d.name().ok());

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device.name() {
                let marker = if default_input.as_deref() == Some(name.as_str()) { "*" } else { " " };
                println!(" {} {} (input)", marker, name);
            }
        }
    }
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device.name() {
                let marker = if default_output.as_deref() == Some(name.as_str()) { "*" } else { " " };
                println!(" {} {} (output)", marker, name);
            }
        }
    }
    println!("(* = default)\n");
}
