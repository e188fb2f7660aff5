//! Internal fixed-size buffers.
//!
//! Each engine allocates one buffer at construction and keeps it for its whole
//! lifetime; the steady-state path never allocates. This module is an
//! implementation detail and not part of the public API.

mod fixed;

pub(crate) use fixed::{ReadBuffer, WriteBuffer};
