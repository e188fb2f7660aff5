//! Ordered observer dispatch.
//!
//! A [`Pipeline`] holds observers in registration order and feeds chunks
//! through them one at a time. It is the single place where observer panics
//! are caught and turned into errors.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::TapError;
use crate::observer::{Observation, Observer};

mod panics;

/// Snapshot of every observer's current result, keyed by observer name.
///
/// Names are not required to be unique. When two observers share a name, the
/// one registered last wins and the other result is not reported.
pub type Results = HashMap<String, Observation>;

/// Observers in dispatch order.
///
/// ```
/// use std::sync::Arc;
/// use streamtap::{Pipeline, SizeObserver};
///
/// let size = Arc::new(SizeObserver::new());
/// let pipeline = Pipeline::new().with(size.clone());
///
/// pipeline.dispatch(b"hello").unwrap();
/// assert_eq!(size.size(), 5);
/// ```
#[derive(Default)]
pub struct Pipeline {
    observers: Vec<Box<dyn Observer>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer and returns the pipeline.
    pub fn with<O: Observer + 'static>(mut self, observer: O) -> Self {
        self.push(observer);
        self
    }

    /// Appends an observer; it runs after every observer already registered.
    pub fn push<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Inserts an observer ahead of every observer already registered.
    pub fn prepend<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.insert(0, Box::new(observer));
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True when no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Observer names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Feeds `chunk` to every observer in order.
    ///
    /// Stops at the first observer that fails and returns its error; later
    /// observers do not see the chunk. A panicking observer is reported as
    /// [`TapError::CallbackPanic`] and never unwinds into the caller. A
    /// rejection never carries a retryable kind (`Interrupted`, `WouldBlock`);
    /// such an error comes back as [`TapError::Observer`].
    pub fn dispatch(&self, chunk: &[u8]) -> Result<(), TapError> {
        for observer in &self.observers {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_data(chunk))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::debug!(observer = observer.name(), error = %err, "observer rejected chunk");
                    return Err(err.into_rejection());
                }
                Err(payload) => {
                    let message = panics::describe(payload.as_ref());
                    tracing::warn!(observer = observer.name(), %message, "observer panicked");
                    return Err(TapError::CallbackPanic(message));
                }
            }
        }
        Ok(())
    }

    /// Collects `result()` from every observer, at call time.
    pub fn results(&self) -> Results {
        let mut out = Results::with_capacity(self.observers.len());
        for observer in &self.observers {
            out.insert(observer.name().to_string(), observer.result());
        }
        out
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("observers", &self.names())
            .finish()
    }
}

impl FromIterator<Box<dyn Observer>> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Box<dyn Observer>>>(iter: I) -> Self {
        Self {
            observers: iter.into_iter().collect(),
        }
    }
}

impl Extend<Box<dyn Observer>> for Pipeline {
    fn extend<I: IntoIterator<Item = Box<dyn Observer>>>(&mut self, iter: I) {
        self.observers.extend(iter);
    }
}
