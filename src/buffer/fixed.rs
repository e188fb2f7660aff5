//! Read-ahead and write-behind buffers with a fixed capacity.

use std::io::{self, Read, Write};

/// Read-ahead buffer between a source and the caller's buffers.
pub(crate) struct ReadBuffer {
    data: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl ReadBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes read from the source but not yet handed to the caller.
    pub(crate) fn buffered(&self) -> &[u8] {
        &self.data[self.pos..self.filled]
    }

    /// Fills `out` from buffered bytes, refilling from `inner` when empty.
    ///
    /// Reads at least as large as the buffer skip it when nothing is pending.
    /// An empty `out` never touches the source.
    pub(crate) fn read_from<R: Read>(&mut self, inner: &mut R, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        if self.pos == self.filled {
            if out.len() >= self.data.len() {
                return inner.read(out);
            }
            let n = inner.read(&mut self.data)?;
            self.pos = 0;
            self.filled = n;
        }

        let available = &self.data[self.pos..self.filled];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Write-behind buffer between the caller and a sink.
pub(crate) struct WriteBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl WriteBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    fn spare(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Accepts bytes from `buf`, flushing to `inner` first when they do not fit.
    ///
    /// Writes at least as large as the buffer go straight to `inner` and may be
    /// short. Returns the number of bytes accepted.
    pub(crate) fn write_to<W: Write>(&mut self, inner: &mut W, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if buf.len() > self.spare() {
            self.flush_to(inner)?;
        }

        if buf.len() >= self.capacity {
            inner.write(buf)
        } else {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    /// Pushes every buffered byte to `inner`.
    ///
    /// On failure the bytes not yet accepted by `inner` stay buffered.
    pub(crate) fn flush_to<W: Write>(&mut self, inner: &mut W) -> io::Result<()> {
        let mut written = 0;
        let result = loop {
            if written == self.data.len() {
                break Ok(());
            }
            match inner.write(&self.data[written..]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write the buffered data",
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };

        if written > 0 {
            tracing::trace!(bytes = written, "flushed write buffer");
        }
        self.data.drain(..written);
        result
    }
}
