//! Error types for capture and band configuration.

use std::path::PathBuf;
use std::time::Duration;
use viz_pulse_api::CaptureState;

/// Failures surfaced by the capture lifecycle.
///
/// None of these are fatal: the session falls back to `Idle` and keeps serving
/// the last published snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No usable capture or playback device
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The platform refused microphone access
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// The file could not be opened or decoded
    #[error("failed to decode {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    /// Decoding did not finish within the configured window
    #[error("decoding {} did not finish within {waited:?}", path.display())]
    DecodeTimeout { path: PathBuf, waited: Duration },

    /// Lifecycle call that is not legal in the current state
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: CaptureState,
    },

    /// The stream failed after it was opened
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Band partition configuration error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PartitionError {
    #[error("invalid band partition: {reason}")]
    InvalidBandPartition { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CaptureError::InvalidTransition {
            action: "resume",
            state: CaptureState::Idle,
        };
        assert_eq!(err.to_string(), "cannot resume while idle");

        let err = CaptureError::DecodeFailure {
            path: PathBuf::from("song.mp3"),
            reason: "not a WAV file".into(),
        };
        assert_eq!(err.to_string(), "failed to decode song.mp3: not a WAV file");
    }
}
