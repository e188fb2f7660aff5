//! Error types for streamtap.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

/// Convenience alias used throughout the crate.
pub type Result<T, E = TapError> = std::result::Result<T, E>;

/// Errors produced by observed streams.
///
/// `TapError` is cheap to clone: clones share the same allocation. An engine
/// caches its first failure and hands out clones of it, so two errors from the
/// same engine compare equal by identity, not just by message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TapError {
    /// The underlying source or sink failed.
    #[error(transparent)]
    Io(Arc<io::Error>),

    /// An observer rejected a chunk.
    #[error(transparent)]
    Observer(Arc<dyn StdError + Send + Sync>),

    /// An observer panicked while handling a chunk.
    #[error("callback panic: {0}")]
    CallbackPanic(String),

    /// The wrapped stream lacks the requested positional capability.
    #[error("{0} not supported")]
    Unsupported(&'static str),

    /// The writer has already been closed.
    #[error("writer is closed")]
    Closed,

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl TapError {
    /// Builds an observation error, the value observers return from `on_data`.
    ///
    /// ```
    /// use streamtap::TapError;
    ///
    /// let err = TapError::observer("oops");
    /// assert_eq!(err.to_string(), "oops");
    /// ```
    pub fn observer<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        TapError::Observer(Arc::from(err.into()))
    }

    /// Recovers the `TapError` carried inside an `io::Error` returned by one of
    /// the `std::io` trait impls.
    pub fn from_io(err: &io::Error) -> Option<&TapError> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<TapError>())
    }

    /// Returns the [`io::ErrorKind`] this error maps to.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            TapError::Io(e) => e.kind(),
            TapError::Unsupported(_) => io::ErrorKind::Unsupported,
            _ => io::ErrorKind::Other,
        }
    }

    /// True for I/O failures that callers are expected to retry.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
        )
    }

    /// Rejections are final: an observer's retryable I/O error is re-tagged as
    /// an observation error so it never reports a retryable kind.
    pub(crate) fn into_rejection(self) -> Self {
        match self {
            TapError::Io(e) if matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
            ) =>
            {
                TapError::Observer(e)
            }
            other => other,
        }
    }
}

impl PartialEq for TapError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TapError::Io(a), TapError::Io(b)) => Arc::ptr_eq(a, b),
            (TapError::Observer(a), TapError::Observer(b)) => Arc::ptr_eq(a, b),
            (TapError::CallbackPanic(a), TapError::CallbackPanic(b)) => a == b,
            (TapError::Unsupported(a), TapError::Unsupported(b)) => a == b,
            (TapError::Closed, TapError::Closed) => true,
            (TapError::InvalidConfig { message: a }, TapError::InvalidConfig { message: b }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl From<io::Error> for TapError {
    fn from(e: io::Error) -> Self {
        // Unwrap errors that already went through `From<TapError> for io::Error`.
        if TapError::from_io(&e).is_none() {
            return TapError::Io(Arc::new(e));
        }
        let kind = e.kind();
        match e.into_inner().map(|inner| inner.downcast::<TapError>()) {
            Some(Ok(tap)) => *tap,
            Some(Err(other)) => TapError::Io(Arc::new(io::Error::new(kind, other))),
            None => TapError::Io(Arc::new(io::Error::from(kind))),
        }
    }
}

impl From<TapError> for io::Error {
    fn from(e: TapError) -> Self {
        io::Error::new(e.kind(), e)
    }
}
