//! Buffered read engine.
//!
//! - [`ObservedReader`] - Wraps a source and feeds every chunk read to a [`Pipeline`](crate::Pipeline)

mod engine;

pub use engine::ObservedReader;
