//! Capture lifecycle and the per-tick analysis loop body.
//!
//! A [`Session`] owns at most one capture source at a time. The host calls
//! [`Session::tick`] once per display refresh; everything else is lifecycle.

use crossbeam_channel::{Receiver, TryRecvError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use viz_pulse_api::{CaptureState, ControlSignal, SessionStatus, SourceKind};

use super::analyzer::AnalysisState;
use super::bands::BandPartition;
use super::capture::{CaptureBackend, CaptureSource};
use super::error::CaptureError;
use super::file_source::DecodedClip;
use super::publisher::{SignalPublisher, SignalReader};
use super::spectrum::{SpectrumAnalyser, SpectrumSettings};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// How long a file may take to decode before the start is abandoned
    pub decode_timeout: Duration,
    pub spectrum: SpectrumSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            decode_timeout: Duration::from_secs(10),
            spectrum: SpectrumSettings::default(),
        }
    }
}

struct PendingDecode {
    path: PathBuf,
    rx: Receiver<Result<DecodedClip, CaptureError>>,
    started: Instant,
}

pub struct Session<B: CaptureBackend> {
    backend: B,
    state: CaptureState,
    source: Option<Box<dyn CaptureSource>>,
    pending: Option<PendingDecode>,
    file_path: Option<PathBuf>,
    file_name: Option<String>,
    decode_timeout: Duration,

    spectrum: SpectrumAnalyser,
    samples: Vec<f32>,
    analysis: AnalysisState,
    publisher: SignalPublisher,
}

impl<B: CaptureBackend> Session<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        let spectrum = SpectrumAnalyser::new(settings.spectrum);
        let samples = vec![0.0; spectrum.fft_size()];
        let publisher = SignalPublisher::new(ControlSignal::silent(spectrum.bins()));

        Self {
            backend,
            state: CaptureState::Idle,
            source: None,
            pending: None,
            file_path: None,
            file_name: None,
            decode_timeout: settings.decode_timeout,
            spectrum,
            samples,
            analysis: AnalysisState::new(),
            publisher,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            file_name: self.file_name.clone(),
        }
    }

    /// Handle for renderers to pull snapshots from
    pub fn reader(&self) -> SignalReader {
        self.publisher.reader()
    }

    pub fn latest(&self) -> Arc<ControlSignal> {
        self.publisher.latest()
    }

    /// The file being played, once its decode has succeeded
    pub fn playing_file(&self) -> Option<&Path> {
        match self.state {
            CaptureState::Running(SourceKind::File) | CaptureState::Paused => {
                self.file_path.as_deref()
            }
            _ => None,
        }
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    /// Replace any current source with the microphone
    pub fn start_microphone(&mut self) -> Result<(), CaptureError> {
        self.stop();

        match self.backend.open_microphone() {
            Ok(source) => {
                self.attach(source);
                info!("microphone capture running");
                Ok(())
            }
            Err(e) => {
                warn!("microphone unavailable: {}", e);
                Err(e)
            }
        }
    }

    /// Replace any current source with a file.
    ///
    /// Decoding happens in the background; the session stays `Pending` until a
    /// later [`tick`](Self::tick) finds the clip ready.
    pub fn start_file(&mut self, path: impl AsRef<Path>) {
        self.stop();

        let path = path.as_ref().to_path_buf();
        let rx = self.backend.decode(path.clone());
        self.begin_pending(path, rx);
    }

    fn begin_pending(&mut self, path: PathBuf, rx: Receiver<Result<DecodedClip, CaptureError>>) {
        self.file_name = Some(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        );
        info!(path = %path.display(), "file decoding started");
        self.file_path = Some(path.clone());
        self.pending = Some(PendingDecode {
            path,
            rx,
            started: Instant::now(),
        });
        self.state = CaptureState::Pending;
    }

    pub fn pause(&mut self) -> Result<(), CaptureError> {
        if self.state != CaptureState::Running(SourceKind::File) {
            return Err(CaptureError::InvalidTransition {
                action: "pause",
                state: self.state,
            });
        }
        if let Some(source) = self.source.as_mut() {
            source.pause()?;
        }
        self.state = CaptureState::Paused;
        info!("playback paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CaptureError> {
        if self.state != CaptureState::Paused {
            return Err(CaptureError::InvalidTransition {
                action: "resume",
                state: self.state,
            });
        }
        if let Some(source) = self.source.as_mut() {
            source.resume()?;
        }
        self.state = CaptureState::Running(SourceKind::File);
        info!("playback resumed");
        Ok(())
    }

    /// Release the source, forget all analysis history and publish silence.
    /// Legal from every state.
    pub fn stop(&mut self) {
        let was = self.state;

        // Dropping closes the stream before anything new is opened
        self.source = None;
        self.pending = None;
        self.file_path = None;
        self.file_name = None;

        self.analysis.reset();
        self.spectrum.reset();
        self.publisher
            .publish(ControlSignal::silent(self.spectrum.bins()));
        self.state = CaptureState::Idle;

        if was != CaptureState::Idle {
            info!(from = %was, "capture stopped");
        }
    }

    /// Run one analysis cycle.
    ///
    /// Resolves a pending file first. Produces a snapshot only while running;
    /// idle, pending and paused ticks leave all analysis state untouched.
    pub fn tick(&mut self) -> Result<Option<Arc<ControlSignal>>, CaptureError> {
        self.poll_pending()?;

        let source = match (self.state, self.source.as_ref()) {
            (CaptureState::Running(_), Some(source)) => source,
            _ => return Ok(None),
        };

        let received = source.read_latest(&mut self.samples);
        let spectrum = self.spectrum.process(&self.samples);
        let signal = self.analysis.tick(spectrum);

        trace!(
            received,
            bass = signal.bass,
            kick = signal.kick,
            impact = signal.impact,
            "tick"
        );

        Ok(Some(self.publisher.publish(signal)))
    }

    fn poll_pending(&mut self) -> Result<(), CaptureError> {
        let (received, path, elapsed) = match self.pending.as_ref() {
            Some(pending) => (
                pending.rx.try_recv(),
                pending.path.clone(),
                pending.started.elapsed(),
            ),
            None => return Ok(()),
        };

        match received {
            Ok(Ok(clip)) => {
                self.pending = None;
                match self.backend.open_playback(clip) {
                    Ok(source) => {
                        self.attach(source);
                        info!(path = %path.display(), "file playback running");
                        Ok(())
                    }
                    Err(e) => {
                        warn!("playback could not start: {}", e);
                        self.stop();
                        Err(e)
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("{}", e);
                self.stop();
                Err(e)
            }
            Err(TryRecvError::Empty) if elapsed >= self.decode_timeout => {
                warn!(path = %path.display(), "decode timed out");
                self.stop();
                Err(CaptureError::DecodeTimeout {
                    path,
                    waited: self.decode_timeout,
                })
            }
            Err(TryRecvError::Empty) => Ok(()),
            Err(TryRecvError::Disconnected) => {
                self.stop();
                Err(CaptureError::DecodeFailure {
                    path,
                    reason: "decoder exited without a result".into(),
                })
            }
        }
    }

    fn attach(&mut self, source: Box<dyn CaptureSource>) {
        let partition =
            BandPartition::rescaled(source.sample_rate() as f32, self.spectrum.fft_size())
                .unwrap_or_else(|e| {
                    warn!("{}; keeping reference bands", e);
                    BandPartition::REFERENCE
                });
        debug!(
            sample_rate = source.sample_rate(),
            kick_end = partition.kick_end(),
            bass_end = partition.bass_end(),
            mid_end = partition.mid_end(),
            treble_end = partition.treble_end(),
            "band partition"
        );
        self.analysis.set_partition(partition);
        self.state = CaptureState::Running(source.kind());
        self.source = Some(source);
    }
}
