//! Entry points: wrap a stream only when something observes it.
//!
//! [`reader`] and [`writer`] hand the stream back untouched when the pipeline
//! is empty, so unobserved streams pay nothing. [`tee_reader`] copies
//! everything read into a second sink.

use std::io::{self, Read, Write};

use crate::observer::MirrorObserver;
use crate::pipeline::{Pipeline, Results};
use crate::reader::ObservedReader;
use crate::error::TapError;
use crate::stream::{Close, ReadAt, WriteAt};
use crate::writer::ObservedWriter;

/// A source, observed or not.
#[derive(Debug)]
pub enum TappedReader<R> {
    /// No observers: the original source, unwrapped.
    Passthrough(R),
    /// The source behind a read engine.
    Observed(ObservedReader<R>),
}

/// A sink, observed or not.
#[derive(Debug)]
pub enum TappedWriter<W> {
    /// No observers: the original sink, unwrapped.
    Passthrough(W),
    /// The sink behind a write engine.
    Observed(ObservedWriter<W>),
}

/// Wraps `inner` so every chunk read is fed to `pipeline`.
///
/// With an empty pipeline, returns `inner` itself.
///
/// ```
/// use std::io::Read;
/// use streamtap::{Pipeline, TappedReader};
///
/// let mut plain = streamtap::reader(&b"abc"[..], Pipeline::new());
/// assert!(matches!(plain, TappedReader::Passthrough(_)));
///
/// let mut out = String::new();
/// plain.read_to_string(&mut out)?;
/// assert_eq!(out, "abc");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn reader<R: Read>(inner: R, pipeline: Pipeline) -> TappedReader<R> {
    if pipeline.is_empty() {
        return TappedReader::Passthrough(inner);
    }
    TappedReader::Observed(ObservedReader::new(inner, pipeline))
}

/// Like [`reader`], with positional reads enabled on the engine.
pub fn reader_at<R: Read + ReadAt>(inner: R, pipeline: Pipeline) -> TappedReader<R> {
    match reader(inner, pipeline) {
        TappedReader::Observed(engine) => TappedReader::Observed(engine.with_read_at()),
        plain => plain,
    }
}

/// Wraps `inner` so every chunk written is fed to `pipeline`.
///
/// With an empty pipeline, returns `inner` itself.
pub fn writer<W: Write>(inner: W, pipeline: Pipeline) -> TappedWriter<W> {
    if pipeline.is_empty() {
        return TappedWriter::Passthrough(inner);
    }
    TappedWriter::Observed(ObservedWriter::new(inner, pipeline))
}

/// Like [`writer`], with positional writes enabled on the engine.
pub fn writer_at<W: Write + WriteAt>(inner: W, pipeline: Pipeline) -> TappedWriter<W> {
    match writer(inner, pipeline) {
        TappedWriter::Observed(engine) => TappedWriter::Observed(engine.with_write_at()),
        plain => plain,
    }
}

/// Reads from `source` while copying every chunk into `mirror`.
///
/// The mirror runs ahead of the observers in `pipeline`, so by the time they
/// see a chunk it has been mirrored. The first mirror failure is kept by the
/// mirror and fails every later chunk; see [`MirrorObserver`].
///
/// ```
/// use std::io::Read;
/// use std::sync::Arc;
/// use streamtap::{Pipeline, SizeObserver};
///
/// let size = Arc::new(SizeObserver::new());
/// let mut tee = streamtap::tee_reader(&b"hello"[..], std::io::sink(), Pipeline::new().with(size.clone()));
///
/// let mut out = Vec::new();
/// tee.read_to_end(&mut out)?;
/// assert_eq!(out, b"hello");
/// assert_eq!(size.size(), 5);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn tee_reader<R, W>(source: R, mirror: W, mut pipeline: Pipeline) -> TappedReader<R>
where
    R: Read,
    W: Write + Send + 'static,
{
    pipeline.prepend(MirrorObserver::new(mirror));
    reader(source, pipeline)
}

impl<R> TappedReader<R> {
    /// True when an engine sits in front of the source.
    pub fn is_observed(&self) -> bool {
        matches!(self, TappedReader::Observed(_))
    }

    /// Current observer results; empty for a pass-through source.
    pub fn results(&self) -> Results {
        match self {
            TappedReader::Passthrough(_) => Results::new(),
            TappedReader::Observed(engine) => engine.results(),
        }
    }

    /// Reference to the source.
    pub fn get_ref(&self) -> &R {
        match self {
            TappedReader::Passthrough(inner) => inner,
            TappedReader::Observed(engine) => engine.get_ref(),
        }
    }

    /// Unwraps the source.
    pub fn into_inner(self) -> R {
        match self {
            TappedReader::Passthrough(inner) => inner,
            TappedReader::Observed(engine) => engine.into_inner(),
        }
    }
}

impl<R: Read> Read for TappedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            TappedReader::Passthrough(inner) => inner.read(buf),
            TappedReader::Observed(engine) => engine.read(buf),
        }
    }
}

impl<R: ReadAt> ReadAt for TappedReader<R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        match self {
            TappedReader::Passthrough(inner) => inner.read_at(buf, offset),
            TappedReader::Observed(engine) => engine.read_at(buf, offset),
        }
    }
}

impl<W> TappedWriter<W> {
    /// True when an engine sits in front of the sink.
    pub fn is_observed(&self) -> bool {
        matches!(self, TappedWriter::Observed(_))
    }

    /// Current observer results; empty for a pass-through sink.
    pub fn results(&self) -> Results {
        match self {
            TappedWriter::Passthrough(_) => Results::new(),
            TappedWriter::Observed(engine) => engine.results(),
        }
    }

    /// Reference to the sink.
    pub fn get_ref(&self) -> &W {
        match self {
            TappedWriter::Passthrough(inner) => inner,
            TappedWriter::Observed(engine) => engine.get_ref(),
        }
    }

    /// Unwraps the sink. An engine's unflushed bytes are discarded.
    pub fn into_inner(self) -> W {
        match self {
            TappedWriter::Passthrough(inner) => inner,
            TappedWriter::Observed(engine) => engine.into_inner(),
        }
    }
}

impl<W: Write> Write for TappedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TappedWriter::Passthrough(inner) => inner.write(buf),
            TappedWriter::Observed(engine) => engine.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TappedWriter::Passthrough(inner) => inner.flush(),
            TappedWriter::Observed(engine) => Write::flush(engine),
        }
    }
}

impl<W: Write + Close> TappedWriter<W> {
    /// Flushes and closes the sink.
    ///
    /// An engine closes at most once and skips the sink close when the final
    /// flush fails; see [`ObservedWriter::close`]. A pass-through sink is
    /// closed directly on every call.
    ///
    /// ```
    /// use std::io::{self, Write};
    /// use std::sync::Arc;
    /// use streamtap::{Close, Pipeline, SizeObserver};
    ///
    /// #[derive(Default)]
    /// struct Spool {
    ///     data: Vec<u8>,
    ///     sealed: bool,
    /// }
    ///
    /// impl Write for Spool {
    ///     fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    ///         self.data.extend_from_slice(buf);
    ///         Ok(buf.len())
    ///     }
    ///     fn flush(&mut self) -> io::Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// impl Close for Spool {
    ///     fn close(&mut self) -> io::Result<()> {
    ///         self.sealed = true;
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let size = Arc::new(SizeObserver::new());
    /// let mut spool = streamtap::writer(Spool::default(), Pipeline::new().with(size.clone()));
    /// spool.write_all(b"hello")?;
    /// spool.close()?;
    ///
    /// assert!(spool.get_ref().sealed);
    /// assert_eq!(spool.get_ref().data, b"hello");
    /// assert_eq!(size.size(), 5);
    /// # Ok::<(), streamtap::TapError>(())
    /// ```
    pub fn close(&mut self) -> Result<(), TapError> {
        match self {
            TappedWriter::Passthrough(inner) => inner.close().map_err(TapError::from),
            TappedWriter::Observed(engine) => {
                engine.enable_close();
                engine.close()
            }
        }
    }
}

impl<W: Write + Close> Close for TappedWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        TappedWriter::close(self).map_err(Into::into)
    }
}

impl<W: WriteAt> WriteAt for TappedWriter<W> {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        match self {
            TappedWriter::Passthrough(inner) => inner.write_at(buf, offset),
            TappedWriter::Observed(engine) => engine.write_at(buf, offset),
        }
    }
}
