//! Envelope: the self-describing wire unit exchanged between peers.
//!
//! An [`Envelope`] is a header plus processed payload, serialised with CBOR
//! (via `ciborium`) so the wire form is tagged and self-describing rather
//! than a raw packed struct — the envelope codec (C6) has no schema of its
//! own to compile against, so a self-describing format is the natural fit.
//! The canonical signing bytes computed from [`MessageHeader::signing_bytes`]
//! are a separate, fixed binary layout and are unaffected by this choice.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{errors::ProtocolError, header::MessageHeader};

/// Envelope wire form: `header` (tag 1) and `payload` (tag 2).
///
/// Field order here is part of the wire compatibility surface: adding a
/// field must append, never reorder or remove, to keep older decoders able
/// to at least reject unknown newer envelopes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Structured header.
    pub header: MessageHeader,
    /// Processed payload bytes (post-compress, post-encrypt).
    pub payload: Bytes,
}

impl Envelope {
    /// Constructs an envelope, already requiring `header.size ==
    /// payload.len()` (callers build the header from the payload they hold).
    #[must_use]
    pub fn new(header: MessageHeader, payload: impl Into<Bytes>) -> Self {
        Self { header, payload: payload.into() }
    }

    /// Serialises the envelope to its wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] only if the CBOR encoder itself
    /// fails, which does not happen for in-memory writers.
    pub fn marshal(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|err| ProtocolError::Malformed(err.to_string()))?;
        Ok(buf)
    }

    /// Deserialises an envelope from wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if the bytes are not a valid
    /// CBOR encoding of an envelope.
    pub fn unmarshal(bytes: &[u8]) -> Result<Self, ProtocolError> {
        ciborium::from_reader(bytes).map_err(|err| ProtocolError::Malformed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sample_header() -> MessageHeader {
        MessageHeader { op: 42, seq_id: 1, size: 5, flags: 0, timestamp: 1000, sign: Bytes::new() }
    }

    #[test]
    fn round_trips_through_wire_bytes() {
        let envelope = Envelope::new(sample_header(), Bytes::from_static(b"hello"));
        let wire = envelope.marshal().expect("should marshal");
        let parsed = Envelope::unmarshal(&wire).expect("should unmarshal");
        assert_eq!(envelope, parsed);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let garbage = [0xff, 0x00, 0x01, 0x02];
        assert!(Envelope::unmarshal(&garbage).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_identity_over_payload_sizes(
            op: u32,
            seq_id in 1u32..,
            payload in prop::collection::vec(any::<u8>(), 0..4096),
        ) {
            #[allow(clippy::cast_possible_truncation)]
            let header = MessageHeader {
                op,
                seq_id,
                size: payload.len() as u32,
                flags: 0,
                timestamp: 1_700_000_000,
                sign: Bytes::new(),
            };
            let envelope = Envelope::new(header, payload.clone());
            let wire = envelope.marshal().expect("should marshal");
            let parsed = Envelope::unmarshal(&wire).expect("should unmarshal");
            prop_assert_eq!(parsed.payload.as_ref(), payload.as_slice());
        }
    }
}
