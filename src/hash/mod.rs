//! Incremental digest state behind the hash observers.
//!
//! - [`HashAlgorithm`] - Supported algorithms and name parsing
//! - [`DigestState`] - Running digest for one algorithm (internal)

mod digest;

pub use digest::HashAlgorithm;
pub(crate) use digest::DigestState;
