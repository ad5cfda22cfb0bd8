//! Fuzz target for the full encode/decode pipeline.
//!
//! Builds a framer with signing and encryption enabled, encodes arbitrary
//! payloads, and feeds both well-formed and bit-flipped envelopes back
//! through decode. Decode must never panic, and every envelope this target
//! itself encoded must decode back to its original payload.

#![no_main]

use arbitrary::Arbitrary;
use framecore::{Framer, FramerConfig, SystemEnv};
use framecore_proto::Envelope;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Scenario {
    op: u32,
    payload: Vec<u8>,
    flip_byte: Option<u8>,
}

fn framer() -> Framer<SystemEnv> {
    let config = FramerConfig {
        sign_key: Some(b"fuzzing-sign-key".to_vec()),
        encrypt_key: Some([7u8; 32]),
        enable_encrypt: true,
        enable_compress: true,
        compress_type: "zstd".to_string(),
        compress_min_bytes: 16,
        ..FramerConfig::default()
    };
    Framer::new(SystemEnv::new(), config).expect("valid fuzz config")
}

fuzz_target!(|scenario: Scenario| {
    let framer = framer();

    let Ok(envelope) = framer.encode(scenario.op, &scenario.payload) else {
        return;
    };

    let (op, payload) = framer.decode(&envelope).expect("self-encoded envelope must decode");
    assert_eq!(op, scenario.op);
    assert_eq!(payload, scenario.payload);

    if let Some(flip) = scenario.flip_byte {
        let Ok(wire) = envelope.marshal() else { return };
        if wire.is_empty() {
            return;
        }
        let mut corrupted = wire;
        let idx = (flip as usize) % corrupted.len();
        corrupted[idx] ^= 0x01;

        if let Ok(reparsed) = Envelope::unmarshal(&corrupted) {
            let _ = framer.decode(&reparsed);
        }
    }
});
