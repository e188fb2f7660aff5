//! The buffered read engine.
//!
//! [`ObservedReader`] sits between a caller and a source. Bytes flow through an
//! internal read-ahead buffer; every non-empty chunk handed to the caller is
//! first passed to the observer pipeline.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use std::sync::Arc;
//! use streamtap::{ObservedReader, Pipeline, SizeObserver};
//!
//! let size = Arc::new(SizeObserver::new());
//! let mut reader = ObservedReader::new(&b"hello world"[..], Pipeline::new().with(size.clone()));
//!
//! let mut out = String::new();
//! reader.read_to_string(&mut out)?;
//!
//! assert_eq!(out, "hello world");
//! assert_eq!(size.size(), 11);
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fmt;
use std::io::{self, Read};

use crate::buffer::ReadBuffer;
use crate::config::TapConfig;
use crate::error::TapError;
use crate::pipeline::{Pipeline, Results};
use crate::stream::{ReadAt, Transfer};

type ReadAtFn<R> = fn(&mut R, &mut [u8], u64) -> io::Result<usize>;

/// A reader that reports every chunk it delivers to a [`Pipeline`].
///
/// Once any call fails (an observer rejects a chunk, an observer panics, or
/// the source errors) the failure is remembered: every later call returns the
/// same error without touching the source or the observers. End of stream is
/// not a failure, and neither are `Interrupted`/`WouldBlock` source errors.
///
/// The engine is not meant to be shared between threads while reading; use
/// one engine per worker. Observers can be shared.
pub struct ObservedReader<R> {
    inner: R,
    buffer: ReadBuffer,
    pipeline: Pipeline,
    read_at: Option<ReadAtFn<R>>,
    error: Option<TapError>,
}

impl<R> ObservedReader<R> {
    /// Wraps `inner` with the default configuration (32 KiB buffer).
    pub fn new(inner: R, pipeline: Pipeline) -> Self {
        Self::build(inner, pipeline, TapConfig::default())
    }

    /// Wraps `inner` with a custom configuration.
    ///
    /// Returns error if the configuration is invalid.
    pub fn with_config(inner: R, pipeline: Pipeline, config: TapConfig) -> Result<Self, TapError> {
        config.validate()?;
        Ok(Self::build(inner, pipeline, config))
    }

    fn build(inner: R, pipeline: Pipeline, config: TapConfig) -> Self {
        Self {
            inner,
            buffer: ReadBuffer::with_capacity(config.buffer_size()),
            pipeline,
            read_at: None,
            error: None,
        }
    }

    /// Snapshot of every observer's current result.
    pub fn results(&self) -> Results {
        self.pipeline.results()
    }

    /// The observers, in dispatch order.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The remembered failure, if any.
    pub fn sticky_error(&self) -> Option<&TapError> {
        self.error.as_ref()
    }

    /// Capacity of the internal buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer.capacity()
    }

    /// True when positional reads were enabled with [`with_read_at`](Self::with_read_at).
    pub fn supports_read_at(&self) -> bool {
        self.read_at.is_some()
    }

    /// Reference to the source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the source. Bytes still in the internal buffer are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads up to `buf.len()` bytes at `offset`, straight from the source.
    ///
    /// Fails with [`TapError::Unsupported`] unless positional reads were enabled
    /// with [`with_read_at`](Self::with_read_at); that failure is not remembered.
    /// The internal buffer and the sequential position are left alone.
    pub fn read_chunk_at(&mut self, buf: &mut [u8], offset: u64) -> Transfer {
        let Some(read_at) = self.read_at else {
            return Transfer::failed(0, TapError::Unsupported("read_at"));
        };
        if let Some(err) = &self.error {
            return Transfer::failed(0, err.clone());
        }

        let n = match read_at(&mut self.inner, buf, offset) {
            Ok(n) => n,
            Err(e) => return self.fail(0, e.into()),
        };
        self.observe(&buf[..n])
    }

    fn observe(&mut self, chunk: &[u8]) -> Transfer {
        if chunk.is_empty() || self.pipeline.is_empty() {
            return Transfer::done(chunk.len());
        }
        match self.pipeline.dispatch(chunk) {
            Ok(()) => Transfer::done(chunk.len()),
            Err(err) => {
                self.stick(&err);
                Transfer::failed(chunk.len(), err)
            }
        }
    }

    /// Source failures; retryable kinds are handed back without sticking.
    fn fail(&mut self, len: usize, err: TapError) -> Transfer {
        if !err.is_transient() {
            self.stick(&err);
        }
        Transfer::failed(len, err)
    }

    fn stick(&mut self, err: &TapError) {
        if self.error.is_none() {
            tracing::debug!(error = %err, "read engine failed, error is now sticky");
            self.error = Some(err.clone());
        }
    }
}

impl<R: ReadAt> ObservedReader<R> {
    /// Enables [`read_chunk_at`](Self::read_chunk_at) for sources that support
    /// positional reads.
    pub fn with_read_at(mut self) -> Self {
        self.read_at = Some(<R as ReadAt>::read_at);
        self
    }
}

impl<R: Read> ObservedReader<R> {
    /// Reads into `buf` through the internal buffer.
    ///
    /// Returns how many bytes landed in `buf` together with the error raised
    /// while reading or observing them. Bytes that were read stay read even
    /// when an observer rejects them.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Transfer {
        if let Some(err) = &self.error {
            return Transfer::failed(0, err.clone());
        }

        let n = match self.buffer.read_from(&mut self.inner, buf) {
            Ok(n) => n,
            Err(e) => return self.fail(0, e.into()),
        };
        self.observe(&buf[..n])
    }
}

impl<R: Read> Read for ObservedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).into_io()
    }
}

impl<R> ReadAt for ObservedReader<R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.read_chunk_at(buf, offset).into_io()
    }
}

impl<R: fmt::Debug> fmt::Debug for ObservedReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedReader")
            .field("inner", &self.inner)
            .field("buffer_size", &self.buffer.capacity())
            .field("buffered", &self.buffer.buffered().len())
            .field("pipeline", &self.pipeline)
            .field("read_at", &self.read_at.is_some())
            .field("error", &self.error)
            .finish()
    }
}
