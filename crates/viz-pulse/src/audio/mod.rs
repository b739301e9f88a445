mod analyzer;
mod bands;
mod capture;
mod error;
mod file_source;
mod gain;
mod publisher;
mod ring;
mod session;
mod shaping;
mod source_pipe;
mod spectrum;
mod transient;

pub use analyzer::AnalysisState;
pub use bands::{aggregate, BandLevels, BandPartition};
pub use capture::{CaptureBackend, CaptureSource, CpalBackend};
pub use error::{CaptureError, PartitionError};
pub use file_source::{decode_wav, DecodedClip};
pub use gain::GainState;
pub use publisher::{SignalPublisher, SignalReader};
pub use session::{Session, SessionSettings};
pub use source_pipe::list_devices;
pub use spectrum::{SpectrumAnalyser, SpectrumSettings, FFT_SIZE};
pub use transient::{Onsets, TransientMemory};
