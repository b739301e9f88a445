//! Seams between the session and real audio devices.

use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::time::Duration;
use viz_pulse_api::SourceKind;

use super::error::CaptureError;
use super::file_source::{spawn_decode, DecodedClip, FilePlayback};
use super::source_pipe::MicSource;

/// A live source of mono samples.
///
/// Dropping the source releases the underlying device or stream; no samples
/// are delivered afterwards.
pub trait CaptureSource {
    fn kind(&self) -> SourceKind;

    fn sample_rate(&self) -> u32;

    /// Copy the newest samples into `out`, zero padding what has not arrived.
    /// Returns the number of real samples copied.
    fn read_latest(&self, out: &mut [f32]) -> usize;

    fn pause(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Opens capture sources for a session
pub trait CaptureBackend {
    fn open_microphone(&mut self) -> Result<Box<dyn CaptureSource>, CaptureError>;

    /// Start decoding `path`; the clip arrives on the returned channel
    fn decode(&mut self, path: PathBuf) -> Receiver<Result<DecodedClip, CaptureError>> {
        spawn_decode(path)
    }

    /// Start audible playback of a decoded clip and analyse what is played
    fn open_playback(&mut self, clip: DecodedClip) -> Result<Box<dyn CaptureSource>, CaptureError>;
}

/// Backend using the platform's default cpal devices
pub struct CpalBackend {
    device_timeout: Duration,
}

impl CpalBackend {
    pub fn new(device_timeout: Duration) -> Self {
        Self { device_timeout }
    }
}

impl CaptureBackend for CpalBackend {
    fn open_microphone(&mut self) -> Result<Box<dyn CaptureSource>, CaptureError> {
        Ok(Box::new(MicSource::open_default(self.device_timeout)?))
    }

    fn open_playback(&mut self, clip: DecodedClip) -> Result<Box<dyn CaptureSource>, CaptureError> {
        Ok(Box::new(FilePlayback::open_default(clip, self.device_timeout)?))
    }
}

/// Sort a device acquisition failure into permission or availability
pub(crate) fn acquisition_error(message: String) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::DeviceUnavailable(message)
    }
}
