// Shared test doubles for the integration tests.
#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use streamtap::{Close, Observation, Observer, ReadAt, TapError, WriteAt};

// ============================================================================
// Observers
// ============================================================================

/// Copies every chunk it sees; reports the chunk lengths.
#[derive(Default)]
pub struct Recorder {
    name: String,
    chunks: Mutex<Vec<Vec<u8>>>,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl Recorder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Also appends its name to `log` on every call.
    pub fn logging(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            chunks: Mutex::new(Vec::new()),
            log: Some(Arc::clone(log)),
        }
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn concat(&self) -> Vec<u8> {
        self.chunks.lock().concat()
    }
}

impl Observer for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }
        self.chunks.lock().push(chunk.to_vec());
        Ok(())
    }

    fn result(&self) -> Observation {
        Observation::List(self.chunks.lock().iter().map(|c| c.len() as u64).collect())
    }
}

/// Fails every call with the same message; counts calls.
pub struct Failing {
    message: &'static str,
    kind: Option<io::ErrorKind>,
    calls: AtomicUsize,
}

impl Failing {
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            kind: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails with an I/O error of `kind` instead of an observation error.
    pub fn with_kind(kind: io::ErrorKind) -> Self {
        Self {
            message: "observer io failure",
            kind: Some(kind),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Observer for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_data(&self, _chunk: &[u8]) -> Result<(), TapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.kind {
            Some(kind) => Err(io::Error::new(kind, self.message).into()),
            None => Err(TapError::observer(self.message)),
        }
    }

    fn result(&self) -> Observation {
        Observation::Count(self.calls() as u64)
    }
}

/// How a [`Panicking`] observer panics.
pub enum PanicWith {
    Text(&'static str),
    Owned(String),
    IoError(&'static str),
    Number(u32),
}

/// Panics on every call.
pub struct Panicking(pub PanicWith);

impl Observer for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn on_data(&self, _chunk: &[u8]) -> Result<(), TapError> {
        match &self.0 {
            PanicWith::Text(text) => panic!("{}", text),
            PanicWith::Owned(text) => std::panic::panic_any(text.clone()),
            PanicWith::IoError(text) => std::panic::panic_any(io::Error::other(*text)),
            PanicWith::Number(n) => std::panic::panic_any(*n),
        }
    }

    fn result(&self) -> Observation {
        Observation::None
    }
}

// ============================================================================
// Streams
// ============================================================================

/// In-memory source that counts calls and can be told to fail.
pub struct Source {
    data: Vec<u8>,
    pos: usize,
    pub reads: usize,
    pub reads_at: usize,
    pub fail_with: Option<io::ErrorKind>,
}

impl Source {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            reads: 0,
            reads_at: 0,
            fail_with: None,
        }
    }

    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::new(b"")
        }
    }
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if let Some(kind) = self.fail_with {
            return Err(io::Error::new(kind, "source failure"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl ReadAt for Source {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.reads_at += 1;
        if let Some(kind) = self.fail_with {
            return Err(io::Error::new(kind, "source failure"));
        }
        let start = (offset as usize).min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}

/// In-memory sink that counts calls and can be told to fail.
#[derive(Default)]
pub struct Sink {
    pub data: Vec<u8>,
    pub writes: usize,
    pub flushes: usize,
    pub closes: usize,
    pub fail_writes: bool,
    pub fail_close: bool,
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if self.fail_writes {
            return Err(io::Error::other("sink failure"));
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl WriteAt for Sink {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        self.writes += 1;
        if self.fail_writes {
            return Err(io::Error::other("sink failure"));
        }
        self.data.write_at(buf, offset)
    }
}

impl Close for Sink {
    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        if self.fail_close {
            return Err(io::Error::other("close failure"));
        }
        Ok(())
    }
}

/// Sink shared with the test through an `Arc`, for sinks moved into a mirror.
#[derive(Clone, Default)]
pub struct SharedSink {
    pub data: Arc<Mutex<Vec<u8>>>,
    pub writes: Arc<AtomicUsize>,
    /// Number of leading writes that fail.
    pub fail_first: usize,
    /// Kind of the failing writes; `Other` when unset.
    pub fail_kind: Option<io::ErrorKind>,
}

impl SharedSink {
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }

    /// Every write fails with `kind`.
    pub fn always_failing(kind: io::ErrorKind) -> Self {
        Self {
            fail_first: usize::MAX,
            fail_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let call = self.writes.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            let kind = self.fail_kind.unwrap_or(io::ErrorKind::Other);
            return Err(io::Error::new(kind, "mirror failure"));
        }
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
