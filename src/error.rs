//! Unified error type for the exchange protocol and the envelope codec.

use thiserror::Error;

/// Every failure the core can report.
///
/// No operation recovers or retries internally: the first failure is returned
/// to the caller and no partial output is produced. Decrypting with the wrong
/// key is *not* an error (the stream mode carries no integrity tag), so there
/// is no variant for it.
#[derive(Debug, Error)]
pub enum Error {
    /// The random source failed while sampling a curve or a private scalar.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// ECDH could not produce a shared secret (mismatched curves, empty secret).
    #[error("key agreement failed: {0}")]
    KeyAgreement(String),

    /// Marshaled key bytes are not a supported EC key.
    #[error("malformed key: {0}")]
    KeyFormat(String),

    /// The random source failed while sampling an IV.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The ciphertext is structurally unusable (shorter than one block).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Envelope text or its payload could not be parsed.
    #[error("malformed envelope: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
