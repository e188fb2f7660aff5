//! Outcome of a single engine read or write.

use std::io;

use crate::error::TapError;

/// Bytes moved by one engine call, plus the error raised while moving or
/// observing them.
///
/// A transfer can carry both a non-zero `len` and an error: when an observer
/// rejects a chunk, the bytes were already moved and are not taken back.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Transfer {
    /// Number of bytes moved to or from the caller's buffer.
    pub len: usize,
    /// First failure raised by this call, if any.
    pub error: Option<TapError>,
}

impl Transfer {
    pub(crate) fn done(len: usize) -> Self {
        Self { len, error: None }
    }

    pub(crate) fn failed(len: usize, error: TapError) -> Self {
        Self {
            len,
            error: Some(error),
        }
    }

    /// True when the call raised no error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into the `std::io` shape.
    ///
    /// Bytes win over errors: when bytes were moved, `Ok(len)` is returned and
    /// the engine's sticky error surfaces on the next call. A transfer that
    /// moved nothing returns its error.
    pub fn into_io(self) -> io::Result<usize> {
        match self.error {
            Some(err) if self.len == 0 => Err(err.into()),
            _ => Ok(self.len),
        }
    }

    /// Converts into a `Result`, dropping the byte count when an error is set.
    pub fn into_result(self) -> Result<usize, TapError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.len),
        }
    }
}
