use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::Mutex;

use super::{Observation, Observer};
use crate::error::TapError;
use crate::hash::{DigestState, HashAlgorithm};

/// Computes a digest of everything that passes through.
///
/// The observer is named after its algorithm (`"sha256"`, `"sha512"`,
/// `"blake3"`). Its result is the digest of the data seen so far; reading it
/// does not reset the state.
///
/// ```
/// use std::io::Read;
/// use std::sync::Arc;
/// use streamtap::{HashObserver, Pipeline};
///
/// let sha = Arc::new(HashObserver::new("sha256"));
/// let mut reader = streamtap::reader(&b"hello world"[..], Pipeline::new().with(sha.clone()));
/// std::io::copy(&mut reader, &mut std::io::sink())?;
///
/// assert_eq!(
///     sha.hex_digest(),
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct HashObserver {
    algorithm: HashAlgorithm,
    state: Mutex<DigestState>,
}

impl HashObserver {
    /// Creates an observer for the named algorithm.
    ///
    /// Unknown names fall back to SHA-256.
    pub fn new(algorithm: &str) -> Self {
        Self::with_algorithm(HashAlgorithm::from_name(algorithm))
    }

    /// Creates an observer for `algorithm`.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            state: Mutex::new(DigestState::new(algorithm)),
        }
    }

    /// The algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest of the data seen so far.
    pub fn digest(&self) -> Vec<u8> {
        self.state.lock().snapshot()
    }

    /// Lower-case hex encoding of [`digest`](Self::digest).
    pub fn hex_digest(&self) -> String {
        hex::encode(self.digest())
    }
}

impl Observer for HashObserver {
    fn name(&self) -> &str {
        self.algorithm.name()
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        self.state.lock().update(chunk);
        Ok(())
    }

    fn result(&self) -> Observation {
        Observation::Bytes(Bytes::from(self.digest()))
    }
}

/// Computes several digests in a single pass.
///
/// Digests are keyed by canonical algorithm name; asking for the same
/// algorithm twice yields one digest.
pub struct MultiHashObserver {
    hashes: BTreeMap<String, HashObserver>,
}

impl MultiHashObserver {
    /// Creates an observer for the named algorithms.
    ///
    /// An empty list means SHA-256 only.
    pub fn new(algorithms: &[&str]) -> Self {
        let mut hashes = BTreeMap::new();
        for name in algorithms {
            let observer = HashObserver::new(name);
            hashes
                .entry(observer.algorithm().name().to_string())
                .or_insert(observer);
        }
        if hashes.is_empty() {
            let observer = HashObserver::with_algorithm(HashAlgorithm::Sha256);
            hashes.insert(observer.algorithm().name().to_string(), observer);
        }
        Self { hashes }
    }

    /// Hex digest for one algorithm, or `None` if it is not computed here.
    pub fn get(&self, algorithm: &str) -> Option<String> {
        self.hashes.get(algorithm).map(HashObserver::hex_digest)
    }

    /// Hex digests for every algorithm.
    pub fn all(&self) -> BTreeMap<String, String> {
        self.hashes
            .iter()
            .map(|(name, h)| (name.clone(), h.hex_digest()))
            .collect()
    }
}

impl Observer for MultiHashObserver {
    fn name(&self) -> &str {
        "multi_hash"
    }

    fn on_data(&self, chunk: &[u8]) -> Result<(), TapError> {
        for h in self.hashes.values() {
            h.on_data(chunk)?;
        }
        Ok(())
    }

    fn result(&self) -> Observation {
        Observation::Map(self.all())
    }
}
