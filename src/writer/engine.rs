//! The buffered write engine.
//!
//! Mirror image of the read engine: the caller's bytes are accepted into an
//! internal write-behind buffer, observed, and pushed to the sink when the
//! buffer fills or on [`flush`](ObservedWriter::flush) /
//! [`close`](ObservedWriter::close).

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::buffer::WriteBuffer;
use crate::config::TapConfig;
use crate::error::TapError;
use crate::pipeline::{Pipeline, Results};
use crate::stream::{Close, Transfer, WriteAt};

type WriteAtFn<W> = fn(&mut W, &[u8], u64) -> io::Result<usize>;
type CloseFn<W> = fn(&mut W) -> io::Result<()>;

/// A writer that reports every chunk it accepts to a [`Pipeline`].
///
/// Failures are sticky exactly as for [`ObservedReader`](crate::ObservedReader).
/// Dropping the writer does not flush: buffered bytes reach the sink only
/// through [`flush`](Self::flush), [`close`](Self::close) or a full buffer.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use std::sync::Arc;
/// use streamtap::{ObservedWriter, Pipeline, SizeObserver};
///
/// let size = Arc::new(SizeObserver::new());
/// let mut writer = ObservedWriter::new(Vec::new(), Pipeline::new().with(size.clone()));
///
/// writer.write_all(b"hello world")?;
/// writer.close()?;
///
/// assert_eq!(writer.get_ref(), b"hello world");
/// assert_eq!(size.size(), 11);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ObservedWriter<W> {
    inner: W,
    buffer: WriteBuffer,
    pipeline: Pipeline,
    write_at: Option<WriteAtFn<W>>,
    close: Option<CloseFn<W>>,
    error: Option<TapError>,
    // Set once by `close`. `&mut self` on `close` already serializes callers;
    // the atomic lets `is_closed` be read through a shared reference.
    closed: AtomicBool,
}

impl<W> ObservedWriter<W> {
    /// Wraps `inner` with the default configuration (32 KiB buffer).
    pub fn new(inner: W, pipeline: Pipeline) -> Self {
        Self::build(inner, pipeline, TapConfig::default())
    }

    /// Wraps `inner` with a custom configuration.
    ///
    /// Returns error if the configuration is invalid.
    pub fn with_config(inner: W, pipeline: Pipeline, config: TapConfig) -> Result<Self, TapError> {
        config.validate()?;
        Ok(Self::build(inner, pipeline, config))
    }

    fn build(inner: W, pipeline: Pipeline, config: TapConfig) -> Self {
        Self {
            inner,
            buffer: WriteBuffer::with_capacity(config.buffer_size()),
            pipeline,
            write_at: None,
            close: None,
            error: None,
            closed: AtomicBool::new(false),
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

    /// Bytes accepted but not yet pushed to the sink.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// True when positional writes were enabled with [`with_write_at`](Self::with_write_at).
    pub fn supports_write_at(&self) -> bool {
        self.write_at.is_some()
    }

    /// True when closing the engine also closes the sink.
    pub fn supports_close(&self) -> bool {
        self.close.is_some()
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the sink. Buffered bytes that were never flushed are discarded.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes `buf` at `offset`, straight to the sink.
    ///
    /// Fails with [`TapError::Unsupported`] unless positional writes were
    /// enabled with [`with_write_at`](Self::with_write_at); that failure is not
    /// remembered. Bypasses the sequential buffer entirely.
    pub fn write_chunk_at(&mut self, buf: &[u8], offset: u64) -> Transfer {
        let Some(write_at) = self.write_at else {
            return Transfer::failed(0, TapError::Unsupported("write_at"));
        };
        if let Some(err) = self.check() {
            return Transfer::failed(0, err);
        }

        let n = match write_at(&mut self.inner, buf, offset) {
            Ok(n) => n,
            Err(e) => return self.fail(0, e.into()),
        };
        self.observe(&buf[..n])
    }

    fn check(&self) -> Option<TapError> {
        if let Some(err) = &self.error {
            return Some(err.clone());
        }
        if self.is_closed() {
            return Some(TapError::Closed);
        }
        None
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

    fn fail(&mut self, len: usize, err: TapError) -> Transfer {
        let err = self.remember(err);
        Transfer::failed(len, err)
    }

    /// Sink failures; retryable kinds are handed back without sticking.
    fn remember(&mut self, err: TapError) -> TapError {
        if !err.is_transient() {
            self.stick(&err);
        }
        err
    }

    fn stick(&mut self, err: &TapError) {
        if self.error.is_none() {
            tracing::debug!(error = %err, "write engine failed, error is now sticky");
            self.error = Some(err.clone());
        }
    }
}

impl<W: WriteAt> ObservedWriter<W> {
    /// Enables [`write_chunk_at`](Self::write_chunk_at) for sinks that support
    /// positional writes.
    pub fn with_write_at(mut self) -> Self {
        self.write_at = Some(<W as WriteAt>::write_at);
        self
    }
}

impl<W: Close> ObservedWriter<W> {
    /// Makes [`close`](Self::close) close the sink after the final flush.
    pub fn with_close(mut self) -> Self {
        self.enable_close();
        self
    }

    pub(crate) fn enable_close(&mut self) {
        self.close = Some(<W as Close>::close);
    }
}

impl<W: Write> ObservedWriter<W> {
    /// Accepts bytes from `buf` into the internal buffer.
    ///
    /// Returns how many bytes were accepted together with the error raised
    /// while writing or observing them. Accepted bytes count as written even
    /// when an observer rejects them.
    pub fn write_chunk(&mut self, buf: &[u8]) -> Transfer {
        if let Some(err) = self.check() {
            return Transfer::failed(0, err);
        }

        let n = match self.buffer.write_to(&mut self.inner, buf) {
            Ok(n) => n,
            Err(e) => return self.fail(0, e.into()),
        };
        self.observe(&buf[..n])
    }

    /// Pushes buffered bytes to the sink and flushes it.
    pub fn flush(&mut self) -> Result<(), TapError> {
        if let Some(err) = self.check() {
            return Err(err);
        }
        self.flush_buffer()
    }

    fn flush_buffer(&mut self) -> Result<(), TapError> {
        let result = self
            .buffer
            .flush_to(&mut self.inner)
            .and_then(|()| self.inner.flush());
        result.map_err(|e| self.remember(e.into()))
    }

    /// Flushes and, when enabled with [`with_close`](Self::with_close), closes
    /// the sink.
    ///
    /// Only the first call does any work; later calls return `Ok(())` whatever
    /// the first outcome was. A failed flush leaves the sink open.
    ///
    /// Taking `&mut self` is what makes concurrent close attempts impossible;
    /// callers sharing a writer across threads wrap it in a mutex, and the
    /// first close through that mutex wins.
    pub fn close(&mut self) -> Result<(), TapError> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        tracing::trace!(buffered = self.buffer.len(), "closing write engine");

        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.flush_buffer()?;

        if let Some(close) = self.close {
            if let Err(e) = close(&mut self.inner) {
                return Err(self.remember(e.into()));
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for ObservedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).into_io()
    }

    fn flush(&mut self) -> io::Result<()> {
        ObservedWriter::flush(self).map_err(Into::into)
    }
}

impl<W> WriteAt for ObservedWriter<W> {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        self.write_chunk_at(buf, offset).into_io()
    }
}

impl<W: Write> Close for ObservedWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        ObservedWriter::close(self).map_err(Into::into)
    }
}

impl<W: fmt::Debug> fmt::Debug for ObservedWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedWriter")
            .field("inner", &self.inner)
            .field("buffer_size", &self.buffer.capacity())
            .field("buffered", &self.buffer.len())
            .field("pipeline", &self.pipeline)
            .field("write_at", &self.write_at.is_some())
            .field("close", &self.close.is_some())
            .field("error", &self.error)
            .field("closed", &self.is_closed())
            .finish()
    }
}
