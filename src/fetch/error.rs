use std::{io, path::PathBuf};

use crate::digest::Sha256Hex;

/// Failure classes a fetch can end in. Every class aborts the run.
///
/// `Filesystem` covers every extraction failure over correctly hashed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    ChecksumMismatch,
    Filesystem,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("GET {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("archive stream failed after {received} bytes")]
    Stream {
        received: u64,
        #[source]
        source: io::Error,
    },
    #[error("archive stream ended after {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: Sha256Hex, actual: Sha256Hex },
    /// The bytes hash correctly but are not a readable gzip'd tar.
    #[error("downloaded archive is not a valid .tar.gz")]
    Archive {
        #[source]
        source: io::Error,
    },
    #[error("extract into {}", dest.display())]
    Filesystem {
        dest: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport { .. } | FetchError::Stream { .. } | FetchError::Truncated { .. } => {
                FailureKind::Transport
            }
            FetchError::ChecksumMismatch { .. } => FailureKind::ChecksumMismatch,
            FetchError::Archive { .. } | FetchError::Filesystem { .. } => FailureKind::Filesystem,
        }
    }

    pub fn is_checksum_mismatch(&self) -> bool {
        self.kind() == FailureKind::ChecksumMismatch
    }
}
