//! Shared types for viz-pulse consumers
//!
//! A renderer depends on this crate alone: it reads [`ControlSignal`] snapshots
//! and may inspect the capture lifecycle through [`SessionStatus`].

pub mod capture;
pub mod signal;

pub use capture::{CaptureState, SessionStatus, SourceKind};
pub use signal::{ceiling, ControlSignal, SPECTRUM_SIZE};
