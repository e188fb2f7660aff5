//! MD5, SHA-1, SHA-2 and BLAKE3 digest state.

use std::fmt;

use sha2::Digest as _;

/// Digest algorithms available to [`HashObserver`](crate::HashObserver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// MD5 (16-byte digest). For checksums only.
    Md5,
    /// SHA-1 (20-byte digest). For checksums only.
    Sha1,
    /// SHA-256 (32-byte digest).
    Sha256,
    /// SHA-512 (64-byte digest).
    Sha512,
    /// BLAKE3 (32-byte digest).
    Blake3,
}

impl HashAlgorithm {
    /// Parses an algorithm name, case-insensitively.
    ///
    /// Unknown names fall back to [`HashAlgorithm::Sha256`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "md5" => HashAlgorithm::Md5,
            "sha1" => HashAlgorithm::Sha1,
            "sha512" => HashAlgorithm::Sha512,
            "blake3" => HashAlgorithm::Blake3,
            _ => HashAlgorithm::Sha256,
        }
    }

    /// Canonical lower-case name, also used as the observer name.
    pub const fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub const fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running digest for one algorithm.
#[derive(Clone)]
pub(crate) enum DigestState {
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    pub(crate) fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => DigestState::Md5(md5::Md5::new()),
            HashAlgorithm::Sha1 => DigestState::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => DigestState::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha512 => DigestState::Sha512(sha2::Sha512::new()),
            HashAlgorithm::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    /// Updates the state with more data.
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Md5(h) => h.update(data),
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
            DigestState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Digest of everything seen so far. The state keeps accepting data.
    pub(crate) fn snapshot(&self) -> Vec<u8> {
        match self {
            DigestState::Md5(h) => h.clone().finalize().to_vec(),
            DigestState::Sha1(h) => h.clone().finalize().to_vec(),
            DigestState::Sha256(h) => h.clone().finalize().to_vec(),
            DigestState::Sha512(h) => h.clone().finalize().to_vec(),
            DigestState::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}
