//! streamtap
//!
//! Transparent instrumentation for byte streams.
//!
//! `streamtap` wraps an existing [`std::io::Read`] or [`std::io::Write`] so
//! that every block of data passing through is also handed to a pipeline of
//! observers: hashers, counters, tee mirrors, or your own accumulators. The
//! wrapped stream keeps its read/write contract. It is designed for:
//!
//! - checksumming downloads and uploads in a single pass
//! - byte accounting across many concurrent transfers
//! - duplicating a stream into a second sink while it is consumed
//!
//! The crate intentionally:
//! - does NOT modify the bytes in flight
//! - does NOT run observers in parallel
//! - does NOT retry anything
//! - does NOT spawn threads or depend on an async runtime
//!
//! Failures are sticky: once an engine reports an error (from the stream, from
//! an observer, or from an observer that panicked), every later call returns
//! that same error without touching the stream again.
//!
//! # Reading
//!
//! ```
//! # #[cfg(feature = "hash")]
//! # {
//! use std::io::Read;
//! use std::sync::Arc;
//! use streamtap::{HashObserver, Pipeline, SizeObserver};
//!
//! let size = Arc::new(SizeObserver::new());
//! let sha = Arc::new(HashObserver::new("sha256"));
//! let pipeline = Pipeline::new().with(size.clone()).with(sha.clone());
//!
//! let mut reader = streamtap::reader(&b"hello world"[..], pipeline);
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out)?;
//!
//! assert_eq!(size.size(), 11);
//! assert_eq!(
//!     sha.hex_digest(),
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//! # }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Writing
//!
//! ```
//! use std::io::Write;
//! use streamtap::{ObservedWriter, Pipeline, SizeObserver};
//!
//! let mut writer = ObservedWriter::new(Vec::new(), Pipeline::new().with(SizeObserver::new()));
//! writer.write_all(b"payload")?;
//! writer.close()?;
//!
//! assert_eq!(writer.results()["size"].as_count(), Some(7));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod observer;
mod pipeline;
mod reader;
mod stream;
mod tap;
mod writer;

mod buffer; // internal fixed-size buffers

#[cfg(feature = "hash")]
mod hash; // internal digest state

//
// Public surface
//

pub use config::{DEFAULT_BUFFER_SIZE, TapConfig};
pub use error::{Result, TapError};
pub use observer::{MirrorObserver, Observation, Observer, SizeObserver};
pub use pipeline::{Pipeline, Results};
pub use reader::ObservedReader;
pub use stream::{Close, ReadAt, Transfer, WriteAt};
pub use tap::{TappedReader, TappedWriter, reader, reader_at, tee_reader, writer, writer_at};
pub use writer::ObservedWriter;

#[cfg(feature = "hash")]
pub use hash::HashAlgorithm;
#[cfg(feature = "hash")]
pub use observer::{HashObserver, MultiHashObserver};
