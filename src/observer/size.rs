use std::sync::atomic::{AtomicU64, Ordering};

use super::{Observation, Observer};
use crate::error::TapError;

/// Counts the bytes that pass through.
///
/// Safe to share across engines on different threads.
#[derive(Debug, Default)]
pub struct SizeObserver {
    size: AtomicU64,
}

impl SizeObserver {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes observed so far.
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }
}

impl Observer for SizeObserver {
    fn name(&self) -> &str {
        "size"
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        self.size.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn result(&self) -> Observation {
        Observation::Count(self.size())
    }
}
