//! Audio analysis that turns a live or recorded stream into a small set of
//! bounded control signals for visualizers.
//!
//! [`audio::Session`] owns capture and runs one analysis cycle per
//! [`tick`](audio::Session::tick); renderers read snapshots through
//! [`audio::SignalReader`].

pub mod audio;
pub mod cli;
pub mod ui;
pub mod utils;
