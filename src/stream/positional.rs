//! Positional and close capabilities.

use std::fs::File;
use std::io::{self, Cursor};

/// Reads at an explicit offset without moving any sequential cursor.
pub trait ReadAt {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns `Ok(0)` at or past the end of the data. Short reads are allowed.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

/// Writes at an explicit offset without moving any sequential cursor.
pub trait WriteAt {
    /// Writes up to `buf.len()` bytes starting at `offset`.
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize>;
}

/// A sink that must be explicitly closed.
pub trait Close {
    /// Releases the sink. Called at most once by an engine.
    fn close(&mut self) -> io::Result<()>;
}

fn slice_read_at(data: &[u8], buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let Ok(start) = usize::try_from(offset) else {
        return Ok(0);
    };
    if start >= data.len() {
        return Ok(0);
    }
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    Ok(n)
}

fn vec_write_at(data: &mut Vec<u8>, buf: &[u8], offset: u64) -> io::Result<usize> {
    let start = usize::try_from(offset)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset overflows usize"))?;
    let end = start
        .checked_add(buf.len())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "offset overflows usize"))?;
    if data.len() < end {
        data.resize(end, 0);
    }
    data[start..end].copy_from_slice(buf);
    Ok(buf.len())
}

impl ReadAt for &[u8] {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        slice_read_at(self, buf, offset)
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        slice_read_at(self, buf, offset)
    }
}

impl<T: AsRef<[u8]>> ReadAt for Cursor<T> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        slice_read_at(self.get_ref().as_ref(), buf, offset)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &mut T {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }
}

impl WriteAt for Vec<u8> {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        vec_write_at(self, buf, offset)
    }
}

impl WriteAt for Cursor<Vec<u8>> {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        vec_write_at(self.get_mut(), buf, offset)
    }
}

impl<T: WriteAt + ?Sized> WriteAt for &mut T {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(buf, offset)
    }
}

impl<T: Close + ?Sized> Close for &mut T {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Close + ?Sized> Close for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

#[cfg(unix)]
impl ReadAt for File {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }
}

#[cfg(unix)]
impl WriteAt for File {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::write_at(self, buf, offset)
    }
}

// `seek_read`/`seek_write` move the OS cursor on Windows; callers mixing
// sequential and positional access on the same handle must account for that.
#[cfg(windows)]
impl ReadAt for File {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

#[cfg(windows)]
impl WriteAt for File {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_write(self, buf, offset)
    }
}
