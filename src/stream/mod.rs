//! Stream capabilities consumed by the engines.
//!
//! Sequential access is plain [`std::io::Read`] / [`std::io::Write`]. The
//! optional capabilities live here:
//!
//! - [`ReadAt`] - positional reads
//! - [`WriteAt`] - positional writes
//! - [`Close`] - explicit close of a sink
//!
//! [`Transfer`] is the full outcome of one engine call: bytes moved plus the
//! error, if any, raised while moving or observing them.

mod positional;
mod transfer;

pub use positional::{Close, ReadAt, WriteAt};
pub use transfer::Transfer;
