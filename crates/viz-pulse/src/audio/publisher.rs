//! Lock-free publication of control signal snapshots.
//!
//! The tick loop swaps in a fully built snapshot; renderers pull the newest one
//! whenever they draw. A reader never sees a half-written frame.

use arc_swap::ArcSwap;
use std::sync::Arc;
use viz_pulse_api::ControlSignal;

pub struct SignalPublisher {
    slot: Arc<ArcSwap<ControlSignal>>,
}

/// Cheap, cloneable read handle for consumers on any thread
#[derive(Clone)]
pub struct SignalReader {
    slot: Arc<ArcSwap<ControlSignal>>,
}

impl SignalPublisher {
    pub fn new(initial: ControlSignal) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// Replace the current snapshot wholesale
    pub fn publish(&self, signal: ControlSignal) -> Arc<ControlSignal> {
        let signal = Arc::new(signal);
        self.slot.store(Arc::clone(&signal));
        signal
    }

    pub fn reader(&self) -> SignalReader {
        SignalReader {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn latest(&self) -> Arc<ControlSignal> {
        self.slot.load_full()
    }
}

impl SignalReader {
    pub fn latest(&self) -> Arc<ControlSignal> {
        self.slot.load_full()
    }
}
