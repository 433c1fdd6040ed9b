//! Secure Token Generation
//!
//! Unguessable tokens for session credentials and CSRF nonces.
//!
//! Tokens are hex-encoded bytes read from the operating system CSPRNG. A read
//! failure latches the generator: it refuses every later request instead of
//! falling back to a weaker source.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::RngCore;
use rand::rngs::OsRng;

/// Minimum token size: 128 bits
pub const MIN_TOKEN_BYTES: usize = 16;

/// Default token size: 256 bits
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Token generation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntropyError {
    /// The secure random source could not be read
    #[error("Secure random source unavailable: {0}")]
    Unavailable(String),

    /// Requested token is too short to be unguessable
    #[error("Token length {0} bytes is below the {MIN_TOKEN_BYTES} byte minimum")]
    TooShort(usize),
}

/// Source of cryptographically secure random bytes
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropyError::Unavailable(e.to_string()))
    }
}

/// Fixed-length secure token generator
pub struct TokenGenerator {
    byte_len: usize,
    source: Box<dyn EntropySource>,
    failed: AtomicBool,
}

impl TokenGenerator {
    /// Generator backed by the OS CSPRNG
    pub fn new(byte_len: usize) -> Result<Self, EntropyError> {
        Self::with_source(byte_len, OsEntropy)
    }

    pub fn with_source(
        byte_len: usize,
        source: impl EntropySource + 'static,
    ) -> Result<Self, EntropyError> {
        if byte_len < MIN_TOKEN_BYTES {
            return Err(EntropyError::TooShort(byte_len));
        }
        Ok(Self {
            byte_len,
            source: Box::new(source),
            failed: AtomicBool::new(false),
        })
    }

    /// Bytes of randomness per token
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Generate a new hex token
    pub fn generate(&self) -> Result<String, EntropyError> {
        if self.failed.load(Ordering::Acquire) {
            return Err(EntropyError::Unavailable(
                "generator disabled after an earlier entropy failure".to_string(),
            ));
        }

        let mut bytes = vec![0u8; self.byte_len];
        if let Err(e) = self.source.fill(&mut bytes) {
            self.failed.store(true, Ordering::Release);
            tracing::error!(error = %e, "Entropy source failed; token generation disabled");
            return Err(e);
        }

        Ok(hex::encode(bytes))
    }

    /// Whether an earlier failure has disabled the generator
    pub fn is_disabled(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("byte_len", &self.byte_len)
            .field("disabled", &self.is_disabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// Fails after `ok_calls` successful fills
    struct FlakySource {
        ok_calls: usize,
        calls: Arc<AtomicUsize>,
    }

    impl EntropySource for FlakySource {
        fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.ok_calls {
                OsEntropy.fill(dest)
            } else {
                Err(EntropyError::Unavailable("getrandom: EIO".to_string()))
            }
        }
    }

    #[test]
    fn test_tokens_are_unique_and_full_length() {
        let generator = TokenGenerator::new(DEFAULT_TOKEN_BYTES).unwrap();
        let mut seen = HashSet::with_capacity(10_000);

        for _ in 0..10_000 {
            let token = generator.generate().unwrap();
            assert_eq!(token.len(), 64);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
            assert!(seen.insert(token), "duplicate token generated");
        }
    }

    #[test]
    fn test_minimum_length_enforced() {
        assert_eq!(
            TokenGenerator::new(15).unwrap_err(),
            EntropyError::TooShort(15)
        );
        let generator = TokenGenerator::new(MIN_TOKEN_BYTES).unwrap();
        assert_eq!(generator.generate().unwrap().len(), 32);
    }

    #[test]
    fn test_failure_latches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = TokenGenerator::with_source(
            32,
            FlakySource {
                ok_calls: 1,
                calls: calls.clone(),
            },
        )
        .unwrap();

        assert!(generator.generate().is_ok());
        assert!(matches!(
            generator.generate(),
            Err(EntropyError::Unavailable(_))
        ));
        assert!(generator.is_disabled());

        // Latched: the source is not consulted again
        assert!(generator.generate().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
