//! Capture lifecycle vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where analysed audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Microphone,
    File,
}

/// Lifecycle state of a capture session.
///
/// `Idle -> Running(Microphone)`, or `Idle -> Pending -> Running(File) <-> Paused`.
/// Any state returns to `Idle` on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    Idle,
    /// A file is being decoded and is not yet audible
    Pending,
    Running(SourceKind),
    /// File playback held; no ticks are produced
    Paused,
}

impl CaptureState {
    pub fn is_playing(&self) -> bool {
        matches!(self, CaptureState::Running(_) | CaptureState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, CaptureState::Paused)
    }

    /// Source feeding the session, if any
    pub fn source(&self) -> Option<SourceKind> {
        match self {
            CaptureState::Running(kind) => Some(*kind),
            CaptureState::Paused | CaptureState::Pending => Some(SourceKind::File),
            CaptureState::Idle => None,
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Pending => write!(f, "pending"),
            CaptureState::Running(SourceKind::Microphone) => write!(f, "running (mic)"),
            CaptureState::Running(SourceKind::File) => write!(f, "running (file)"),
            CaptureState::Paused => write!(f, "paused"),
        }
    }
}

/// Externally visible summary of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: CaptureState,
    /// Display name of the file being played, if any
    pub file_name: Option<String>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
            file_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_flags() {
        assert!(!CaptureState::Idle.is_playing());
        assert!(!CaptureState::Pending.is_playing());
        assert!(CaptureState::Running(SourceKind::Microphone).is_playing());
        assert!(CaptureState::Paused.is_playing());
        assert!(CaptureState::Paused.is_paused());
        assert!(!CaptureState::Running(SourceKind::File).is_paused());
    }

    #[test]
    fn test_state_source() {
        assert_eq!(CaptureState::Idle.source(), None);
        assert_eq!(CaptureState::Paused.source(), Some(SourceKind::File));
        assert_eq!(
            CaptureState::Running(SourceKind::Microphone).source(),
            Some(SourceKind::Microphone)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CaptureState::Running(SourceKind::File).to_string(), "running (file)");
        assert_eq!(CaptureState::Idle.to_string(), "idle");
    }
}
