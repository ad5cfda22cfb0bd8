//! Fuzz target for `MessageHeader` boundary conditions.
//!
//! Exercises `validate_structure` and `signing_bytes` with boundary-chosen
//! field values (zero, max, reserved flag bits) rather than raw wire bytes,
//! since the header's wire form is CBOR and has no fixed byte offsets of
//! its own to target directly.

#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use framecore_proto::{MessageHeader, flags};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum FlagsChoice {
    Known(bool, bool),
    Reserved(u32),
    Raw(u32),
}

#[derive(Debug, Arbitrary)]
struct BoundaryHeader {
    op: u32,
    seq_id: u32,
    size: u32,
    flags: FlagsChoice,
    timestamp: u64,
    payload: Vec<u8>,
}

fuzz_target!(|input: BoundaryHeader| {
    let flags_value = match input.flags {
        FlagsChoice::Known(compressed, encrypted) => {
            (if compressed { flags::COMPRESSED } else { 0 }) | (if encrypted { flags::ENCRYPTED } else { 0 })
        },
        FlagsChoice::Reserved(bits) => bits | 0x8000_0000,
        FlagsChoice::Raw(bits) => bits,
    };

    let header = MessageHeader {
        op: input.op,
        seq_id: input.seq_id,
        size: input.size,
        flags: flags_value,
        timestamp: input.timestamp,
        sign: Bytes::new(),
    };

    let signed = header.signing_bytes(&input.payload);
    assert_eq!(signed.len(), 24 + input.payload.len());

    match header.validate_structure() {
        Ok(()) => {
            assert_eq!(header.flags & !flags::KNOWN, 0);
            assert_ne!(header.seq_id, 0);
        },
        Err(_) => {},
    }
});
