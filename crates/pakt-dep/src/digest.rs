//! SHA-256 helpers.

use std::io::{self, Write};

use sha2::{Digest, Sha256};

/// Writer that hashes everything written through it
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Flush and return the inner writer with the lowercase hex digest
    pub fn finish(mut self) -> io::Result<(W, String)> {
        self.inner.flush()?;
        Ok((self.inner, format!("{:x}", self.hasher.finalize())))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_writer() {
        let mut writer = HashingWriter::new(Vec::new());
        writer.write_all(b"test-").unwrap();
        writer.write_all(b"fixture").unwrap();

        let (bytes, digest) = writer.finish().unwrap();
        assert_eq!(bytes, b"test-fixture");
        assert_eq!(
            digest,
            "576dd8416de5619ea001d9662291d62444d1292a38e96956bc4651c01f14bca1"
        );
    }

    #[test]
    fn test_empty_input() {
        let (_, digest) = HashingWriter::new(io::sink()).finish().unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
