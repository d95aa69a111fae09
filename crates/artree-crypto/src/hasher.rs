use std::io::{self, Read, Write};

use artree_types::{DigestConfig, HashAlgorithm, Identifier};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Git-style content hasher.
///
/// Every identity is the digest of the canonical header
/// `"blob " + declared_len + "\0"` followed by exactly `declared_len` bytes
/// of content. Binding the declared length into the hashed bytes keeps
/// payloads of different lengths apart in the identity space.
///
/// When the configuration names more than one algorithm, the content is
/// read once and fed to every digest accumulator in the same pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashEngine {
    config: DigestConfig,
}

impl HashEngine {
    /// Engine producing plain SHA-1 identities.
    pub const SHA1: Self = Self::new(DigestConfig::Sha1);
    /// Engine producing plain SHA-256 identities.
    pub const SHA256: Self = Self::new(DigestConfig::Sha256);
    /// Engine producing tagged `sha1+sha256:<sha1>+<sha256>` identities.
    pub const SHA1_SHA256: Self = Self::new(DigestConfig::Sha1Sha256);

    pub const fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> DigestConfig {
        self.config
    }

    /// Hash exactly `declared_len` bytes from `reader`.
    ///
    /// Fails with [`HashError::ShortRead`] if the reader reaches end of input
    /// early and with [`HashError::LongRead`] if it still has bytes to offer
    /// once `declared_len` bytes were consumed. No identity is returned on
    /// failure.
    pub fn identity_of_reader<R: Read>(
        &self,
        reader: R,
        declared_len: u64,
    ) -> Result<Identifier, HashError> {
        let mut sink = DigestSink::new(self.config);
        sink.update(&header(declared_len));

        let mut limited = reader.take(declared_len);
        let actual = io::copy(&mut limited, &mut sink)?;
        if actual < declared_len {
            debug!(expected = declared_len, actual, "short read while hashing");
            return Err(HashError::ShortRead {
                expected: declared_len,
                actual,
            });
        }

        let mut rest = limited.into_inner();
        let mut extra = [0u8; 1];
        loop {
            match rest.read(&mut extra) {
                Ok(0) => break,
                Ok(_) => {
                    debug!(expected = declared_len, "long read while hashing");
                    return Err(HashError::LongRead {
                        expected: declared_len,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(sink.finish())
    }

    /// Hash an in-memory buffer; the declared length is `data.len()`.
    pub fn identity_of(&self, data: &[u8]) -> Identifier {
        let mut sink = DigestSink::new(self.config);
        sink.update(&header(data.len() as u64));
        sink.update(data);
        sink.finish()
    }

    /// Verify that `data` hashes to `expected`.
    pub fn verify(&self, data: &[u8], expected: &Identifier) -> bool {
        self.identity_of(data) == *expected
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new(DigestConfig::default())
    }
}

/// Canonical object header: `blob <len>\0`.
pub fn header(len: u64) -> Vec<u8> {
    format!("blob {len}\0").into_bytes()
}

enum Accumulator {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Accumulator {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

/// Fan-out writer feeding every configured digest.
struct DigestSink {
    config: DigestConfig,
    accumulators: Vec<Accumulator>,
}

impl DigestSink {
    fn new(config: DigestConfig) -> Self {
        Self {
            config,
            accumulators: config.algorithms().iter().copied().map(Accumulator::new).collect(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        for acc in &mut self.accumulators {
            acc.update(data);
        }
    }

    fn finish(self) -> Identifier {
        let digests: Vec<Vec<u8>> = self.accumulators.into_iter().map(Accumulator::finalize).collect();
        Identifier::from_digests(self.config, &digests)
    }
}

impl Write for DigestSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The stream ended before the declared length was reached.
    #[error("short read from object: {actual} out of expected {expected}")]
    ShortRead { expected: u64, actual: u64 },

    /// The stream had more content than declared.
    #[error("long read from object: more than expected {expected} bytes")]
    LongRead { expected: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
