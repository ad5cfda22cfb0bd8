//! Fuzz target for `Envelope::unmarshal`.
//!
//! Arbitrary bytes should never panic the CBOR decoder, only return an
//! error.

#![no_main]

use framecore_proto::Envelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Envelope::unmarshal(data);
});
