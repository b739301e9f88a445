//! Fixed-size ring of the most recent mono samples.
//!
//! Written from the audio callback thread, read once per tick.

use parking_lot::Mutex;
use std::sync::Arc;

pub type SharedRing = Arc<Mutex<SampleRing>>;

pub struct SampleRing {
    data: Vec<f32>,
    write_idx: usize,
    filled: bool,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            write_idx: 0,
            filled: false,
        }
    }

    pub fn shared(capacity: usize) -> SharedRing {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn push(&mut self, sample: f32) {
        self.data[self.write_idx] = sample;
        self.write_idx = (self.write_idx + 1) % self.data.len();
        if self.write_idx == 0 {
            self.filled = true;
        }
    }

    /// Copy the newest samples into `out`, oldest first.
    ///
    /// When fewer samples have arrived than `out` holds, the front is zero
    /// filled. Returns how many real samples were copied.
    pub fn copy_latest(&self, out: &mut [f32]) -> usize {
        let available = if self.filled { self.data.len() } else { self.write_idx };
        let count = available.min(out.len());
        let pad = out.len() - count;
        out[..pad].iter_mut().for_each(|s| *s = 0.0);

        let capacity = self.data.len();
        let start = (self.write_idx + capacity - count) % capacity;
        for (i, slot) in out[pad..].iter_mut().enumerate() {
            *slot = self.data[(start + i) % capacity];
        }
        count
    }
}
