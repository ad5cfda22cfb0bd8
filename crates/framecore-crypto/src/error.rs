//! Error types for signing, encryption, and compression strategies.

use thiserror::Error;

/// Errors surfaced by [`crate::signer`], [`crate::cipher`], and
/// [`crate::compress`] implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Authenticated encryption failed to produce ciphertext.
    #[error("encryption failed")]
    EncryptFailed,

    /// Authenticated decryption failed (bad key, tampered ciphertext, or
    /// truncated input).
    #[error("decryption failed")]
    DecryptFailed,

    /// Input shorter than the cipher's fixed nonce size.
    #[error("ciphertext of {len} bytes shorter than nonce size {nonce_size}")]
    CiphertextTooShort {
        /// Length actually provided.
        len: usize,
        /// Required nonce size.
        nonce_size: usize,
    },

    /// Compression failed.
    #[error("compression failed: {0}")]
    CompressFailed(String),

    /// Decompression failed (corrupt or truncated compressed data).
    #[error("decompression failed: {0}")]
    DecompressFailed(String),

    /// No compressor registered under the requested name.
    #[error("unknown compressor: {0}")]
    UnknownCompressor(String),
}

/// Convenience alias for results returning [`CryptoError`].
pub type Result<T> = std::result::Result<T, CryptoError>;
