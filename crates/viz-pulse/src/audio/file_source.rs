//! File decoding and looped playback.
//!
//! WAV resources are decoded on a worker thread so a slow disk never stalls the
//! tick loop. Once decoded, the clip plays on the default output device and
//! the mono mix of what is played feeds the analysis ring.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use viz_pulse_api::SourceKind;

use super::capture::{acquisition_error, CaptureSource};
use super::error::CaptureError;
use super::ring::{SampleRing, SharedRing};
use super::source_pipe::get_config_with_timeout;
use super::spectrum::FFT_SIZE;

/// Fully decoded audio resource
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    /// Display name (file name without directories)
    pub name: String,
    /// Interleaved samples in `[-1, 1]`
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedClip {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn frame(&self, index: usize) -> &[f32] {
        let start = index * self.channels;
        &self.samples[start..start + self.channels]
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate.max(1) as f64)
    }
}

/// Decode a WAV file completely
pub fn decode_wav(path: &Path) -> Result<DecodedClip, CaptureError> {
    let failure = |reason: String| CaptureError::DecodeFailure {
        path: path.to_path_buf(),
        reason,
    };

    let reader = hound::WavReader::open(path).map_err(|e| failure(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(failure(format!(
            "unusable format: {} channels at {} Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<f32>, hound::Error>>(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << spec.bits_per_sample.saturating_sub(1).min(31)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<f32>, hound::Error>>()
        }
    }
    .map_err(|e| failure(e.to_string()))?;

    let channels = spec.channels as usize;
    if samples.len() < channels {
        return Err(failure("no audio frames".into()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(DecodedClip {
        name,
        samples,
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Decode `path` on a worker thread.
///
/// The result arrives on the returned channel. Dropping the receiver abandons
/// the decode; the worker's send then fails silently.
pub fn spawn_decode(path: PathBuf) -> Receiver<Result<DecodedClip, CaptureError>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        debug!(path = %path.display(), "decoding");
        let _ = tx.send(decode_wav(&path));
    });
    rx
}

/// Position in a looping clip played at a different rate than recorded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    position: f64,
    step: f64,
}

impl Playhead {
    pub fn new(clip_rate: u32, device_rate: u32) -> Self {
        Self {
            position: 0.0,
            step: clip_rate.max(1) as f64 / device_rate.max(1) as f64,
        }
    }

    /// Frame index to play now; moves on and wraps at `frames`
    pub fn advance(&mut self, frames: usize) -> usize {
        if frames == 0 {
            return 0;
        }
        let index = (self.position as usize).min(frames - 1);
        self.position += self.step;
        while self.position >= frames as f64 {
            self.position -= frames as f64;
        }
        index
    }
}

/// Looped audible playback of a decoded clip
pub struct FilePlayback {
    ring: SharedRing,
    sample_rate: u32,
    paused: Arc<AtomicBool>,
    stream: Stream,
}

impl FilePlayback {
    pub fn open_default(clip: DecodedClip, timeout: Duration) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default output device".into()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let (format, stream_config) = get_config_with_timeout(&device, false, timeout)?;
        let ring = SampleRing::shared(FFT_SIZE);
        let paused = Arc::new(AtomicBool::new(false));
        let clip = Arc::new(clip);

        let stream = match format {
            SampleFormat::F32 => build_output::<f32>(&device, &stream_config, &clip, &ring, &paused),
            SampleFormat::I16 => build_output::<i16>(&device, &stream_config, &clip, &ring, &paused),
            SampleFormat::U16 => build_output::<u16>(&device, &stream_config, &clip, &ring, &paused),
            other => Err(CaptureError::DeviceUnavailable(format!(
                "unsupported output sample format {other:?}"
            ))),
        }?;

        stream.play().map_err(|e| CaptureError::Stream(e.to_string()))?;

        info!(
            file = %clip.name,
            device = %name,
            duration = ?clip.duration(),
            clip_rate = clip.sample_rate,
            device_rate = stream_config.sample_rate.0,
            "playback started"
        );

        Ok(Self {
            ring,
            // What reaches the ring is resampled to the device rate
            sample_rate: stream_config.sample_rate.0,
            paused,
            stream,
        })
    }
}

impl CaptureSource for FilePlayback {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        self.ring.lock().copy_latest(out)
    }

    fn pause(&mut self) -> Result<(), CaptureError> {
        self.paused.store(true, Ordering::Release);
        // Not every backend can pause; the flag alone silences the callback
        if let Err(e) = self.stream.pause() {
            warn!("output stream pause unsupported: {}", e);
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        self.paused.store(false, Ordering::Release);
        self.stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))
    }
}

fn build_output<T>(
    device: &Device,
    config: &StreamConfig,
    clip: &Arc<DecodedClip>,
    ring: &SharedRing,
    paused: &Arc<AtomicBool>,
) -> Result<Stream, CaptureError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = (config.channels as usize).max(1);
    let mut playhead = Playhead::new(clip.sample_rate, config.sample_rate.0);
    let clip = Arc::clone(clip);
    let ring = Arc::clone(ring);
    let paused = Arc::clone(paused);
    let err_fn = |err| warn!("output stream error: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if paused.load(Ordering::Acquire) {
                    data.iter_mut().for_each(|s| *s = T::EQUILIBRIUM);
                    return;
                }

                let mut ring = ring.lock();
                for out in data.chunks_mut(channels) {
                    let frame = clip.frame(playhead.advance(clip.frames()));
                    let mono = frame.iter().sum::<f32>() / frame.len() as f32;

                    for (c, slot) in out.iter_mut().enumerate() {
                        // Matching layouts keep channels apart, others get the mix
                        let value = if frame.len() == channels { frame[c] } else { mono };
                        *slot = T::from_sample(value.clamp(-1.0, 1.0));
                    }
                    ring.push(mono);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| acquisition_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beat.wav");
        write_wav(&path, 2, 22_050, &[16_384, -16_384, 0, 32_767]);

        let clip = decode_wav(&path).unwrap();
        assert_eq!(clip.name, "beat.wav");
        assert_eq!(clip.channels, 2);
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.frames(), 2);
        assert_eq!(clip.frame(0), &[0.5, -0.5]);
        assert!((clip.frame(1)[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_decode_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pad.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.25f32, -0.75, 0.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let clip = decode_wav(&path).unwrap();
        assert_eq!(clip.samples, vec![0.25, -0.75, 0.0]);
    }

    #[test]
    fn test_decode_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"ID3 definitely not a riff header").unwrap();

        let err = decode_wav(&path).unwrap_err();
        assert!(matches!(err, CaptureError::DecodeFailure { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            decode_wav(&dir.path().join("missing.wav")),
            Err(CaptureError::DecodeFailure { .. })
        ));

        let empty = dir.path().join("empty.wav");
        write_wav(&empty, 1, 44_100, &[]);
        assert!(matches!(decode_wav(&empty), Err(CaptureError::DecodeFailure { .. })));
    }

    #[test]
    fn test_spawn_decode_delivers_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 1, 8_000, &[1, 2, 3]);

        let rx = spawn_decode(path);
        let deadline = Instant::now() + Duration::from_secs(5);
        let clip = rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .unwrap()
            .unwrap();
        assert_eq!(clip.frames(), 3);
    }

    #[test]
    fn test_playhead_loops() {
        let mut head = Playhead::new(44_100, 44_100);
        let played: Vec<usize> = (0..7).map(|_| head.advance(3)).collect();
        assert_eq!(played, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_playhead_steps_by_rate_ratio() {
        // Clip at half the device rate: every frame plays twice
        let mut head = Playhead::new(22_050, 44_100);
        let played: Vec<usize> = (0..6).map(|_| head.advance(10)).collect();
        assert_eq!(played, vec![0, 0, 1, 1, 2, 2]);

        let mut fast = Playhead::new(48_000, 24_000);
        let played: Vec<usize> = (0..4).map(|_| fast.advance(5)).collect();
        assert_eq!(played, vec![0, 2, 4, 1]);
    }

    #[test]
    fn test_playhead_empty_clip() {
        let mut head = Playhead::new(44_100, 48_000);
        assert_eq!(head.advance(0), 0);
    }
}
