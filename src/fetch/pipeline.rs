//! Single-pass hash + gunzip + untar over any byte source.
//!
//! The source is read once. Every byte goes through the hasher before the
//! gzip decoder sees it, so the digest covers exactly what was received,
//! including anything after the tar end-of-archive marker.

use flate2::read::GzDecoder;
use std::{
    io::{self, Read},
    path::Path,
};
use tar::Archive;
use tracing::{debug, warn};

use super::FetchError;
use crate::digest::{HashingReader, Sha256Hex};

/// What one pass over an archive stream produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub bytes: u64,
    pub digest: Sha256Hex,
    pub members: usize,
}

/// Extract the gzip'd tar read from `reader` into `dest` while hashing it.
///
/// `expected_len` is the advertised body length, when known. A shorter
/// stream is reported as truncated rather than as a checksum mismatch.
///
/// Extraction happens before the digest is known. On a mismatch the files
/// already written stay in `dest`.
pub fn verify_and_extract<R: Read>(
    reader: R,
    expected: &Sha256Hex,
    expected_len: Option<u64>,
    dest: &Path,
) -> Result<Extracted, FetchError> {
    let mut archive = Archive::new(GzDecoder::new(HashingReader::new(reader)));
    archive.set_preserve_permissions(false);
    archive.set_unpack_xattrs(false);
    archive.set_overwrite(true);

    let unpacked = unpack_members(&mut archive, dest);

    // Get the hasher back and consume whatever the extractor left unread
    let mut hashing = archive.into_inner().into_inner();
    let (members, unpack_err) = match unpacked {
        Ok(n) => (n, None),
        Err(err) => (0, Some(err)),
    };

    if hashing.upstream_failed() {
        let source = unpack_err
            .map(UnpackError::into_io)
            .unwrap_or_else(|| io::Error::other("upstream read failed"));
        return Err(FetchError::Stream {
            received: hashing.bytes_read(),
            source,
        });
    }

    if let Err(source) = hashing.drain() {
        return Err(FetchError::Stream {
            received: hashing.bytes_read(),
            source,
        });
    }

    let received = hashing.bytes_read();
    if let Some(expected_len) = expected_len {
        if received < expected_len {
            return Err(FetchError::Truncated {
                received,
                expected: expected_len,
            });
        }
    }

    let digest = hashing.finalize();
    if &digest != expected {
        return Err(FetchError::ChecksumMismatch {
            expected: expected.clone(),
            actual: digest,
        });
    }

    // The bytes are the right ones, so what failed is the archive or the disk
    match unpack_err {
        Some(UnpackError::Format(source)) => Err(FetchError::Archive { source }),
        Some(UnpackError::Write(source)) => Err(FetchError::Filesystem {
            dest: dest.to_path_buf(),
            source,
        }),
        None => Ok(Extracted {
            bytes: received,
            digest,
            members,
        }),
    }
}

/// Where an unpack stopped: decoding the stream, or writing a member.
#[derive(Debug)]
enum UnpackError {
    Format(io::Error),
    Write(io::Error),
}

impl UnpackError {
    /// Errors out of `unpack_in` keep their kind; decoder failures use these.
    fn classify(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                UnpackError::Format(err)
            }
            _ => UnpackError::Write(err),
        }
    }

    fn into_io(self) -> io::Error {
        match self {
            UnpackError::Format(err) | UnpackError::Write(err) => err,
        }
    }
}

fn unpack_members<R: Read>(archive: &mut Archive<R>, dest: &Path) -> Result<usize, UnpackError> {
    let mut count = 0;
    for entry in archive.entries().map_err(UnpackError::Format)? {
        let mut entry = entry.map_err(UnpackError::Format)?;
        let member = entry.path().map_err(UnpackError::Format)?.into_owned();

        // unpack_in refuses paths that would land outside `dest`
        if entry.unpack_in(dest).map_err(UnpackError::classify)? {
            debug!(member = %member.display(), "extracted");
            count += 1;
        } else {
            warn!(member = %member.display(), "skipped archive member outside destination");
        }
    }
    Ok(count)
}
