use sha2::{Digest, Sha256};
use std::io::{self, Read};

use super::Sha256Hex;

/// Passes bytes through from `inner` while feeding every chunk to a SHA-256
/// hasher.
///
/// Anything buffered further down the reader chain has already been hashed
/// here. Dropping the downstream decoder therefore never loses bytes from
/// the digest.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
    upstream_failed: bool,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
            upstream_failed: false,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// True once a read from `inner` has returned an error.
    pub fn upstream_failed(&self) -> bool {
        self.upstream_failed
    }

    /// Read `inner` to EOF, hashing everything, and return the bytes drained.
    pub fn drain(&mut self) -> io::Result<u64> {
        io::copy(self, &mut io::sink())
    }

    pub fn finalize(self) -> Sha256Hex {
        Sha256Hex::from_hasher(self.hasher)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.hasher.update(&buf[..n]);
                self.bytes_read += n as u64;
                Ok(n)
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Err(err),
            Err(err) => {
                self.upstream_failed = true;
                Err(err)
            }
        }
    }
}
