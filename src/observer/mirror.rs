use std::io::Write;
use std::sync::OnceLock;

use parking_lot::Mutex;

use super::{Observation, Observer};
use crate::error::TapError;

/// Copies every chunk it observes into a second sink.
///
/// The first write failure is kept for good: every later chunk gets the same
/// error back and the sink is not written again, even if it would recover.
/// This failure state belongs to the mirror alone and is independent of the
/// sticky error of the engine it is registered with.
pub struct MirrorObserver<W> {
    sink: Mutex<W>,
    error: OnceLock<TapError>,
}

impl<W: Write> MirrorObserver<W> {
    /// Name under which the mirror appears in result snapshots.
    pub const NAME: &'static str = "_tee_writer";

    /// Creates a mirror writing into `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
            error: OnceLock::new(),
        }
    }

    /// The failure that stopped mirroring, if any.
    pub fn error(&self) -> Option<&TapError> {
        self.error.get()
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> Observer for MirrorObserver<W> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        if let Some(err) = self.error.get() {
            return Err(err.clone());
        }

        if let Err(e) = self.sink.lock().write_all(chunk) {
            let err = self.error.get_or_init(|| TapError::from(e));
            tracing::debug!(error = %err, "tee mirror failed");
            return Err(err.clone());
        }
        Ok(())
    }

    fn result(&self) -> Observation {
        Observation::None
    }
}
