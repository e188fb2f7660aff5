//! Configuration for observed streams.
//!
//! - [`TapConfig`] - Internal buffer sizing

use crate::error::TapError;

/// Default size of the internal read-ahead / write-behind buffer (32 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Configuration shared by [`ObservedReader`](crate::ObservedReader) and
/// [`ObservedWriter`](crate::ObservedWriter).
///
/// The buffer size is the granularity at which the engine talks to the
/// underlying stream. It also bounds how large a chunk observers see when
/// callers issue small reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TapConfig {
    buffer_size: usize,
}

impl TapConfig {
    /// Creates a new configuration.
    ///
    /// Returns error if `buffer_size` is zero.
    pub fn new(buffer_size: usize) -> Result<Self, TapError> {
        if buffer_size == 0 {
            return Err(TapError::InvalidConfig {
                message: "buffer size must be non-zero",
            });
        }

        Ok(Self { buffer_size })
    }

    /// Sets the buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), TapError> {
        Self::new(self.buffer_size).map(|_| ())
    }
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
