//! Error taxonomy for the framer's encode/decode pipeline.

use thiserror::Error;

/// Errors from [`crate::framer::Framer::encode`] and
/// [`crate::framer::Framer::decode`].
///
/// All decode-side variants are non-retriable per-frame: the frame is
/// dropped and the caller should keep the session open, only logging or
/// surfacing the error to an `on_error` callback (see
/// `framecore-session`/`framecore-transport`). Each variant carries `op`
/// and/or `seq_id` where already known at the point of failure, so callers
/// can log enough context to diagnose replay storms, clock skew, and key
/// mismatches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramerError {
    /// The envelope or its header was absent or structurally invalid.
    #[error("bad envelope: {0}")]
    BadEnvelope(String),

    /// `|now - header.timestamp|` exceeded the configured tolerance.
    #[error("timestamp {timestamp} outside tolerance (op={op:?}, seq_id={seq_id:?})")]
    TimestampOutOfWindow {
        /// Header timestamp that was rejected.
        timestamp: u64,
        /// Operation code, if already parsed.
        op: Option<u32>,
        /// Sequence id, if already parsed.
        seq_id: Option<u32>,
    },

    /// A signer is configured but the envelope carried no tag.
    #[error("missing signature (op={op:?}, seq_id={seq_id:?})")]
    MissingSignature {
        /// Operation code.
        op: Option<u32>,
        /// Sequence id.
        seq_id: Option<u32>,
    },

    /// The authentication tag did not verify.
    #[error("signature mismatch (op={op:?}, seq_id={seq_id:?})")]
    SignatureMismatch {
        /// Operation code.
        op: Option<u32>,
        /// Sequence id.
        seq_id: Option<u32>,
    },

    /// The `(seq_id, timestamp)` pair was already seen within the replay
    /// window, or the pair was otherwise rejected as stale.
    #[error("replayed or duplicate frame (op={op:?}, seq_id={seq_id})")]
    ReplayedOrDuplicate {
        /// Operation code.
        op: Option<u32>,
        /// Sequence id that was rejected.
        seq_id: u32,
    },

    /// AEAD decryption failed (bad key, tampered ciphertext, truncated
    /// input).
    #[error("decrypt failed (op={op:?}, seq_id={seq_id:?})")]
    DecryptFailed {
        /// Operation code.
        op: Option<u32>,
        /// Sequence id.
        seq_id: Option<u32>,
    },

    /// Decompression failed on a frame carrying the `COMPRESSED` flag.
    #[error("decompress failed (op={op:?}, seq_id={seq_id:?})")]
    DecompressFailed {
        /// Operation code.
        op: Option<u32>,
        /// Sequence id.
        seq_id: Option<u32>,
    },

    /// Encryption is enabled (at construction, or signalled by a received
    /// `ENCRYPTED` flag) but no key is configured.
    #[error("encrypt key missing")]
    EncryptKeyMissing,

    /// Compression failed during encode.
    #[error("compress failed (op={op:?})")]
    CompressFailed {
        /// Operation code.
        op: Option<u32>,
    },

    /// Encryption failed during encode (bad key, cipher rejected the
    /// payload). The encode-time counterpart to `DecryptFailed`, which
    /// covers the decode side only.
    #[error("encrypt failed (op={op:?})")]
    EncryptFailed {
        /// Operation code.
        op: Option<u32>,
    },
}

/// Convenience alias for results returning [`FramerError`].
pub type Result<T> = std::result::Result<T, FramerError>;
