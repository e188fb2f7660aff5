//! Buffered write engine.
//!
//! - [`ObservedWriter`] - Wraps a sink and feeds every chunk written to a [`Pipeline`](crate::Pipeline)

mod engine;

pub use engine::ObservedWriter;
