//! Fixed-field message header and flag bits.
//!
//! Unlike a raw binary-packed layout, [`MessageHeader`] travels on the wire
//! through the self-describing envelope codec (see [`crate::envelope`]); the
//! fixed big-endian byte layout used only for computing the signature is
//! reconstructed on demand by [`MessageHeader::signing_bytes`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Bit flags carried in [`MessageHeader::flags`].
pub mod flags {
    /// Payload was compressed by the framer before encryption.
    pub const COMPRESSED: u32 = 0x01;
    /// Payload was encrypted by the framer after compression.
    pub const ENCRYPTED: u32 = 0x02;
    /// Bits recognised by this version of the protocol; all others reserved.
    pub const KNOWN: u32 = COMPRESSED | ENCRYPTED;
}

/// Length, in bytes, of the fixed portion of the canonical signing layout
/// (`op || seq_id || size || flags || timestamp`), excluding `sign` and the
/// payload itself.
pub const SIGNING_PREFIX_LEN: usize = 24;

/// Structured header accompanying every envelope.
///
/// # Invariants
///
/// - `size == length(payload)` (enforced by the framer when building the
///   header, not by this type itself).
/// - `seq_id != 0`.
/// - `flags & !flags::KNOWN == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Application-defined dispatch key.
    pub op: u32,
    /// Sequence identifier, unique per sender within the live replay window.
    pub seq_id: u32,
    /// Length of the processed payload (post-compress, post-encrypt).
    pub size: u32,
    /// `COMPRESSED` / `ENCRYPTED` bitfield; all other bits reserved.
    pub flags: u32,
    /// Unix seconds at encode time.
    pub timestamp: u64,
    /// Authentication tag; empty when the framer has no signer configured.
    pub sign: Bytes,
}

impl MessageHeader {
    /// Builds the canonical byte layout fed to the signer: the fixed
    /// big-endian header prefix (`op`, `seq_id`, `size`, `flags`,
    /// `timestamp`) concatenated with the processed payload. `sign` is never
    /// part of this region.
    #[must_use]
    pub fn signing_bytes(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SIGNING_PREFIX_LEN + payload.len());
        buf.extend_from_slice(&self.op.to_be_bytes());
        buf.extend_from_slice(&self.seq_id.to_be_bytes());
        buf.extend_from_slice(&self.size.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    /// Rejects headers carrying reserved flag bits or a zero `seq_id`.
    pub fn validate_structure(&self) -> Result<()> {
        if self.flags & !flags::KNOWN != 0 {
            return Err(ProtocolError::ReservedFlagsSet(self.flags));
        }
        if self.seq_id == 0 {
            return Err(ProtocolError::ZeroSeqId);
        }
        Ok(())
    }

    /// Whether the `COMPRESSED` bit is set.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.flags & flags::COMPRESSED != 0
    }

    /// Whether the `ENCRYPTED` bit is set.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.flags & flags::ENCRYPTED != 0
    }
}
