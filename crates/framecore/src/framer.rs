//! The framer (C5): orchestrates the encode/decode pipeline.
//!
//! This is the dense, educative centre of the crate. Compression,
//! encryption, sequence numbering, timestamping, and signing are each
//! implemented elsewhere (`framecore-crypto`, [`crate::sequence`]); this
//! module owns only their ordering and the envelope shape that results.

use std::sync::Arc;

use bytes::Bytes;
use framecore_crypto::{
    Compressor, Signer, SymmetricCipher,
    cipher::ChaCha20Poly1305Cipher,
    compress,
    signer::HmacSha256Signer,
};
use framecore_proto::{Envelope, MessageHeader, flags};

use crate::{
    env::Environment,
    error::{FramerError, Result},
    sequence::{SequenceConfig, SequenceIdManager},
};

/// Recognised configuration options (§6 of the framing specification); any
/// other knob is rejected at construction rather than silently ignored.
#[derive(Debug, Clone)]
pub struct FramerConfig {
    /// Enables signing when present.
    pub sign_key: Option<Vec<u8>>,
    /// Required if `enable_encrypt` is true.
    pub encrypt_key: Option<[u8; 32]>,
    /// Turns on the encrypt step; requires `encrypt_key`.
    pub enable_encrypt: bool,
    /// Turns on the compress step (gated by `compress_min_bytes`).
    pub enable_compress: bool,
    /// Name of a registered [`Compressor`], e.g. `"none"`, `"snappy"`, `"zstd"`.
    pub compress_type: String,
    /// Minimum payload length to attempt compression.
    pub compress_min_bytes: usize,
    /// Max allowed `|now - timestamp|`, in seconds.
    pub timestamp_tolerance: u64,
    /// Entries retained for replay detection.
    pub seq_cache_size: usize,
    /// Seconds past which a seq entry is eligible for eviction.
    pub seq_time_window: u64,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            sign_key: None,
            encrypt_key: None,
            enable_encrypt: false,
            enable_compress: false,
            compress_type: "none".to_string(),
            compress_min_bytes: 256,
            timestamp_tolerance: 300,
            seq_cache_size: 10_000,
            seq_time_window: 300,
        }
    }
}

/// Orchestrates the encode/decode pipeline for one session's traffic.
///
/// A `Framer` is bound one-per-session (see `framecore-session`); it is not
/// shared mutable state across sessions beyond the process-global
/// compressor registry it reads from at construction time.
pub struct Framer<E: Environment> {
    env: E,
    signer: Option<Arc<dyn Signer>>,
    cipher: Option<Arc<dyn SymmetricCipher>>,
    compressor: Arc<dyn Compressor>,
    enable_compress: bool,
    compress_min_bytes: usize,
    timestamp_tolerance: u64,
    seqmgr: SequenceIdManager,
}

impl<E: Environment> Framer<E> {
    /// Builds a framer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FramerError::EncryptKeyMissing`] if `enable_encrypt` is set
    /// without an `encrypt_key`. Returns [`FramerError::BadEnvelope`] if
    /// `compress_type` names an unregistered codec.
    pub fn new(env: E, config: FramerConfig) -> Result<Self> {
        if config.enable_encrypt && config.encrypt_key.is_none() {
            return Err(FramerError::EncryptKeyMissing);
        }

        let cipher = config
            .encrypt_key
            .map(|key| Arc::new(ChaCha20Poly1305Cipher::new(key)) as Arc<dyn SymmetricCipher>);

        let signer =
            config.sign_key.map(|key| Arc::new(HmacSha256Signer::new(key)) as Arc<dyn Signer>);

        let compressor = compress::require(&config.compress_type)
            .map_err(|err| FramerError::BadEnvelope(err.to_string()))?;

        Ok(Self {
            env,
            signer,
            cipher,
            compressor,
            enable_compress: config.enable_compress,
            compress_min_bytes: config.compress_min_bytes,
            timestamp_tolerance: config.timestamp_tolerance,
            seqmgr: SequenceIdManager::new(SequenceConfig {
                cache_size: config.seq_cache_size,
                time_window: config.seq_time_window,
            }),
        })
    }

    /// Encodes `(op, payload)` into a self-describing, tamper-evident
    /// envelope. Pipeline: compress → encrypt → assign seq_id → build
    /// header → sign.
    ///
    /// # Errors
    ///
    /// [`FramerError::CompressFailed`] or [`FramerError::EncryptFailed`] if
    /// the configured codec/cipher rejects the payload.
    pub fn encode(&self, op: u32, payload: &[u8]) -> Result<Envelope> {
        let mut work = payload.to_vec();
        let mut flag_bits = 0u32;

        if self.enable_compress && work.len() >= self.compress_min_bytes {
            work = self
                .compressor
                .compress(&work)
                .map_err(|_| FramerError::CompressFailed { op: Some(op) })?;
            flag_bits |= flags::COMPRESSED;
        }

        if let Some(cipher) = &self.cipher {
            work =
                cipher.encrypt(&work).map_err(|_| FramerError::EncryptFailed { op: Some(op) })?;
            flag_bits |= flags::ENCRYPTED;
        }

        let seq_id = self.seqmgr.next();

        let mut header = MessageHeader {
            op,
            seq_id,
            #[allow(clippy::cast_possible_truncation)]
            size: work.len() as u32,
            flags: flag_bits,
            timestamp: self.env.now_unix_seconds(),
            sign: Bytes::new(),
        };

        if let Some(signer) = &self.signer {
            header.sign = Bytes::from(signer.sign(&header.signing_bytes(&work)));
        }

        Ok(Envelope::new(header, work))
    }

    /// Reverses [`Self::encode`]. Pipeline: time gate → verify signature →
    /// replay check → decrypt (if `ENCRYPTED`) → decompress (if
    /// `COMPRESSED`).
    ///
    /// Gates run cheap-to-expensive (time, signature, replay) before any
    /// decryption, so no attacker-controlled byte is decrypted before the
    /// tag authenticates it.
    ///
    /// # Errors
    ///
    /// See [`FramerError`] for the full taxonomy; all variants are
    /// non-retriable for this single frame.
    pub fn decode(&self, envelope: &Envelope) -> Result<(u32, Vec<u8>)> {
        let header = &envelope.header;
        header
            .validate_structure()
            .map_err(|err| FramerError::BadEnvelope(err.to_string()))?;

        let now = self.env.now_unix_seconds();
        if now.abs_diff(header.timestamp) > self.timestamp_tolerance {
            return Err(FramerError::TimestampOutOfWindow {
                timestamp: header.timestamp,
                op: Some(header.op),
                seq_id: Some(header.seq_id),
            });
        }

        if let Some(signer) = &self.signer {
            if header.sign.is_empty() {
                return Err(FramerError::MissingSignature {
                    op: Some(header.op),
                    seq_id: Some(header.seq_id),
                });
            }
            let signing_bytes = header.signing_bytes(&envelope.payload);
            if !signer.verify(&signing_bytes, &header.sign) {
                return Err(FramerError::SignatureMismatch {
                    op: Some(header.op),
                    seq_id: Some(header.seq_id),
                });
            }
        }

        if !self.seqmgr.validate(header.seq_id, header.timestamp, now) {
            return Err(FramerError::ReplayedOrDuplicate {
                op: Some(header.op),
                seq_id: header.seq_id,
            });
        }

        let mut work = envelope.payload.to_vec();

        if header.is_encrypted() {
            let cipher = self.cipher.as_ref().ok_or(FramerError::EncryptKeyMissing)?;
            work = cipher.decrypt(&work).map_err(|_| FramerError::DecryptFailed {
                op: Some(header.op),
                seq_id: Some(header.seq_id),
            })?;
        }

        if header.is_compressed() {
            work = self.compressor.decompress(&work).map_err(|_| FramerError::DecompressFailed {
                op: Some(header.op),
                seq_id: Some(header.seq_id),
            })?;
        }

        Ok((header.op, work))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use super::*;

    #[derive(Clone)]
    struct FakeEnv {
        now: Arc<AtomicU64>,
    }

    impl FakeEnv {
        fn new(now: u64) -> Self {
            Self { now: Arc::new(AtomicU64::new(now)) }
        }

        fn set(&self, now: u64) {
            self.now.store(now, Ordering::SeqCst);
        }
    }

    impl Environment for FakeEnv {
        fn now_unix_seconds(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }

        async fn sleep(&self, _duration: Duration) {}

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(0x42);
        }
    }

    fn plain_config() -> FramerConfig {
        FramerConfig::default()
    }

    #[test]
    fn s1_plain_round_trip() {
        let framer = Framer::new(FakeEnv::new(1_000), plain_config()).unwrap();
        let envelope = framer.encode(42, b"hello").unwrap();
        assert_eq!(envelope.header.flags, 0);
        assert!(envelope.header.sign.is_empty());

        let (op, payload) = framer.decode(&envelope).unwrap();
        assert_eq!(op, 42);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn s2_compressed_threshold() {
        let config = FramerConfig {
            enable_compress: true,
            compress_type: "snappy".to_string(),
            compress_min_bytes: 256,
            ..plain_config()
        };
        let framer = Framer::new(FakeEnv::new(1_000), config).unwrap();

        let small = vec![0x41u8; 100];
        let small_envelope = framer.encode(1, &small).unwrap();
        assert_eq!(small_envelope.header.flags & flags::COMPRESSED, 0);

        let big = vec![0x41u8; 300];
        let big_envelope = framer.encode(1, &big).unwrap();
        assert_eq!(big_envelope.header.flags & flags::COMPRESSED, flags::COMPRESSED);

        let (_, decoded) = framer.decode(&big_envelope).unwrap();
        assert_eq!(decoded, big);
    }

    #[test]
    fn s3_encrypted_and_signed() {
        let config = FramerConfig {
            sign_key: Some(b"sign-key".to_vec()),
            encrypt_key: Some([9u8; 32]),
            enable_encrypt: true,
            ..plain_config()
        };
        let framer = Framer::new(FakeEnv::new(1_000), config).unwrap();

        let payload = vec![0xAB; 1024];
        let envelope = framer.encode(7, &payload).unwrap();
        assert_eq!(envelope.header.flags & flags::ENCRYPTED, flags::ENCRYPTED);

        let (op, decoded) = framer.decode(&envelope).unwrap();
        assert_eq!(op, 7);
        assert_eq!(decoded, payload);

        let mut tampered = envelope.clone();
        let mut ciphertext = tampered.payload.to_vec();
        ciphertext[0] ^= 0xff;
        tampered.payload = Bytes::from(ciphertext);
        assert_eq!(
            framer.decode(&tampered).unwrap_err(),
            FramerError::SignatureMismatch { op: Some(7), seq_id: Some(envelope.header.seq_id) }
        );
    }

    #[test]
    fn s4_replay_is_rejected_on_second_decode() {
        let framer = Framer::new(FakeEnv::new(1_000), plain_config()).unwrap();
        let envelope = framer.encode(1, b"once").unwrap();

        assert!(framer.decode(&envelope).is_ok());
        assert_eq!(
            framer.decode(&envelope).unwrap_err(),
            FramerError::ReplayedOrDuplicate { op: Some(1), seq_id: envelope.header.seq_id }
        );
    }

    #[test]
    fn s5_clock_skew_rejected() {
        let env = FakeEnv::new(1_000);
        let config = FramerConfig { timestamp_tolerance: 60, ..plain_config() };
        let framer = Framer::new(env.clone(), config).unwrap();

        let envelope = framer.encode(1, b"skewed").unwrap();

        env.set(1_000 + 120);
        let err = framer.decode(&envelope).unwrap_err();
        assert!(matches!(err, FramerError::TimestampOutOfWindow { .. }));
    }

    #[test]
    fn tamper_detection_across_header_fields() {
        let config = FramerConfig { sign_key: Some(b"k".to_vec()), ..plain_config() };
        let framer = Framer::new(FakeEnv::new(1_000), config).unwrap();
        let envelope = framer.encode(1, b"payload").unwrap();

        let mut tampered_op = envelope.clone();
        tampered_op.header.op ^= 1;
        assert!(matches!(
            framer.decode(&tampered_op).unwrap_err(),
            FramerError::SignatureMismatch { .. }
        ));

        let mut tampered_flags = envelope.clone();
        tampered_flags.header.flags ^= 0x01;
        assert!(matches!(
            framer.decode(&tampered_flags).unwrap_err(),
            FramerError::SignatureMismatch { .. } | FramerError::BadEnvelope(_)
        ));

        let mut tampered_sign = envelope.clone();
        let mut sign = tampered_sign.header.sign.to_vec();
        sign[0] ^= 1;
        tampered_sign.header.sign = Bytes::from(sign);
        assert!(matches!(
            framer.decode(&tampered_sign).unwrap_err(),
            FramerError::SignatureMismatch { .. }
        ));
    }

    #[test]
    fn construction_fails_without_encrypt_key() {
        let config = FramerConfig { enable_encrypt: true, ..plain_config() };
        assert_eq!(
            Framer::new(FakeEnv::new(1_000), config).unwrap_err(),
            FramerError::EncryptKeyMissing
        );
    }

    #[test]
    fn missing_signature_rejected_when_signer_configured() {
        let config = FramerConfig { sign_key: Some(b"k".to_vec()), ..plain_config() };
        let framer = Framer::new(FakeEnv::new(1_000), config).unwrap();

        let unsigned_config = plain_config();
        let unsigned_framer = Framer::new(FakeEnv::new(1_000), unsigned_config).unwrap();
        let unsigned_envelope = unsigned_framer.encode(1, b"no sig").unwrap();

        assert!(matches!(
            framer.decode(&unsigned_envelope).unwrap_err(),
            FramerError::MissingSignature { .. }
        ));
    }

    #[test]
    fn round_trip_identity_across_payload_sizes() {
        let config = FramerConfig {
            enable_compress: true,
            compress_type: "zstd".to_string(),
            sign_key: Some(b"k".to_vec()),
            encrypt_key: Some([1u8; 32]),
            enable_encrypt: true,
            ..plain_config()
        };

        for size in [0usize, 1, 255, 256, 257, 4096, 1024 * 1024] {
            let framer = Framer::new(FakeEnv::new(1_000), config.clone()).unwrap();
            let payload = vec![0x7Au8; size];
            let envelope = framer.encode(99, &payload).unwrap();
            let (op, decoded) = framer.decode(&envelope).unwrap();
            assert_eq!(op, 99);
            assert_eq!(decoded, payload, "round-trip mismatch at size {size}");
        }
    }
}
