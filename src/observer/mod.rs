//! The observer contract and the observers shipped with the crate.
//!
//! An [`Observer`] is handed every non-empty chunk that passes through an
//! engine, in order, exactly once. It may reject a chunk by returning an error;
//! the engine then stops dispatching and remembers the failure.
//!
//! - [`SizeObserver`] - Counts bytes
//! - [`HashObserver`] - Running digest (requires `hash` feature)
//! - [`MultiHashObserver`] - Several digests in one pass (requires `hash` feature)
//! - [`MirrorObserver`] - Copies every chunk to a second sink

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::TapError;

mod mirror;
mod size;

#[cfg(feature = "hash")]
mod hash;

pub use mirror::MirrorObserver;
pub use size::SizeObserver;

#[cfg(feature = "hash")]
pub use hash::{HashObserver, MultiHashObserver};

/// A pluggable component that inspects each chunk passing through an engine.
///
/// Methods take `&self` so that one observer can be shared by several engines
/// (wrap it in an [`Arc`]); implementations synchronize their own state.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use streamtap::{Observation, Observer, TapError};
///
/// struct Lines(AtomicU64);
///
/// impl Observer for Lines {
///     fn name(&self) -> &str {
///         "lines"
///     }
///
///     fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
///         let n = chunk.iter().filter(|&&b| b == b'\n').count() as u64;
///         self.0.fetch_add(n, Ordering::Relaxed);
///         Ok(())
///     }
///
///     fn result(&self) -> Observation {
///         Observation::Count(self.0.load(Ordering::Relaxed))
///     }
/// }
/// ```
pub trait Observer: Send + Sync {
    /// Stable identifier, used as the key in result snapshots.
    fn name(&self) -> &str;

    /// Receives one chunk.
    ///
    /// The chunk is only valid for the duration of the call; copy what needs
    /// to outlive it.
    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError>;

    /// Current (or final) result.
    fn result(&self) -> Observation;
}

impl<T: Observer + ?Sized> Observer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        (**self).on_data(chunk)
    }

    fn result(&self) -> Observation {
        (**self).result()
    }
}

impl<T: Observer + ?Sized> Observer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        (**self).on_data(chunk)
    }

    fn result(&self) -> Observation {
        (**self).result()
    }
}

/// Value reported by [`Observer::result`].
///
/// Two [`Observation::Other`] values are equal only when they share the same
/// allocation.
#[derive(Debug, Clone, Default)]
pub enum Observation {
    /// Nothing to report.
    #[default]
    None,
    /// A counter.
    Count(u64),
    /// Raw bytes, such as a digest.
    Bytes(Bytes),
    /// Free-form text.
    Text(String),
    /// A sequence of numbers.
    List(Vec<u64>),
    /// Named string values, such as hex digests keyed by algorithm.
    Map(BTreeMap<String, String>),
    /// Any other value; read it back with [`as_other`](Observation::as_other).
    Other(Arc<dyn Any + Send + Sync>),
}

impl PartialEq for Observation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Observation::None, Observation::None) => true,
            (Observation::Count(a), Observation::Count(b)) => a == b,
            (Observation::Bytes(a), Observation::Bytes(b)) => a == b,
            (Observation::Text(a), Observation::Text(b)) => a == b,
            (Observation::List(a), Observation::List(b)) => a == b,
            (Observation::Map(a), Observation::Map(b)) => a == b,
            (Observation::Other(a), Observation::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Observation {}

impl Observation {
    /// Returns the counter, if this is a [`Observation::Count`].
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Observation::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a [`Observation::Bytes`].
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Observation::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the map, if this is a [`Observation::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Observation::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the value, if this is an [`Observation::Other`] holding a `T`.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use streamtap::Observation;
    ///
    /// let histogram = Observation::Other(Arc::new([3u64, 0, 7]));
    /// assert_eq!(histogram.as_other::<[u64; 3]>(), Some(&[3, 0, 7]));
    /// assert_eq!(histogram.as_other::<String>(), None);
    /// ```
    pub fn as_other<T: Any>(&self) -> Option<&T> {
        match self {
            Observation::Other(v) => v.downcast_ref(),
            _ => None,
        }
    }
}
