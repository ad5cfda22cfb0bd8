//! Wire-level error types for envelope parsing and construction.

use thiserror::Error;

/// Errors from building or parsing the wire-level envelope structure.
///
/// These are structural errors only (malformed bytes, reserved bits);
/// authentication and freshness failures live in the framer crate, one
/// layer up, where the signer and sequence-id manager are available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// One or more reserved flag bits were set.
    #[error("reserved flag bits set: {0:#010x}")]
    ReservedFlagsSet(u32),

    /// `seq_id` was zero, which the wire format forbids.
    #[error("seq_id must not be zero")]
    ZeroSeqId,

    /// The envelope could not be decoded from its wire bytes.
    #[error("malformed envelope: {0}")]
    Malformed(String),
}

/// Convenience alias for results returning [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;
