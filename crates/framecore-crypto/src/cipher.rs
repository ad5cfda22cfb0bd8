//! Authenticated encryption with a per-call random nonce.

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use zeroize::ZeroizeOnDrop;

use crate::error::{CryptoError, Result};

/// Authenticated encryption contract. Wire form of [`SymmetricCipher::encrypt`]
/// is always `nonce || ciphertext_and_tag`; the nonce size is fixed per
/// implementation and drawn from a CSPRNG on every call. Callers must never
/// reuse a nonce with the same key, which this contract enforces by
/// generating a fresh one on every `encrypt`.
pub trait SymmetricCipher: Send + Sync {
    /// Fixed nonce size, in bytes, for this cipher.
    fn nonce_size(&self) -> usize;

    /// Encrypts `plaintext`, returning `nonce || ciphertext_and_tag`.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts `nonce || ciphertext_and_tag` produced by [`Self::encrypt`].
    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>>;
}

/// ChaCha20-Poly1305 with a 12-byte random nonce.
#[derive(ZeroizeOnDrop)]
pub struct ChaCha20Poly1305Cipher {
    key: [u8; 32],
}

const NONCE_SIZE: usize = 12;

impl ChaCha20Poly1305Cipher {
    /// Builds a cipher from a 32-byte key.
    #[must_use]
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl SymmetricCipher for ChaCha20Poly1305Cipher {
    fn nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new((&self.key).into());

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext =
            cipher.encrypt(nonce, plaintext).map_err(|_| CryptoError::EncryptFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::CiphertextTooShort {
                len: sealed.len(),
                nonce_size: NONCE_SIZE,
            });
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let cipher = ChaCha20Poly1305::new((&self.key).into());
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher.decrypt(nonce, ciphertext).map_err(|_| CryptoError::DecryptFailed)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn encrypt_then_decrypt_roundtrips() {
        let cipher = ChaCha20Poly1305Cipher::new([7u8; 32]);
        let plaintext = b"a secret message";
        let sealed = cipher.encrypt(plaintext).expect("should encrypt");
        let decrypted = cipher.decrypt(&sealed).expect("should decrypt");
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let cipher = ChaCha20Poly1305Cipher::new([1u8; 32]);
        let sealed = cipher.encrypt(b"").expect("should encrypt");
        assert_eq!(cipher.decrypt(&sealed).expect("should decrypt"), b"");
    }

    #[test]
    fn repeated_calls_use_distinct_nonces() {
        let cipher = ChaCha20Poly1305Cipher::new([3u8; 32]);
        let a = cipher.encrypt(b"same plaintext").expect("should encrypt");
        let b = cipher.encrypt(b"same plaintext").expect("should encrypt");
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let cipher = ChaCha20Poly1305Cipher::new([9u8; 32]);
        let mut sealed = cipher.encrypt(b"tamper me").expect("should encrypt");
        let last = sealed.len() - 1;
        sealed[last] ^= 0xff;
        assert!(cipher.decrypt(&sealed).is_err());
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let encrypted_with = ChaCha20Poly1305Cipher::new([1u8; 32]);
        let decrypted_with = ChaCha20Poly1305Cipher::new([2u8; 32]);
        let sealed = encrypted_with.encrypt(b"hello").expect("should encrypt");
        assert!(decrypted_with.decrypt(&sealed).is_err());
    }

    #[test]
    fn truncated_input_rejected_before_decrypt_attempt() {
        let cipher = ChaCha20Poly1305Cipher::new([4u8; 32]);
        let err = cipher.decrypt(&[0u8; 4]).unwrap_err();
        assert_eq!(err, CryptoError::CiphertextTooShort { len: 4, nonce_size: NONCE_SIZE });
    }

    proptest! {
        #[test]
        fn round_trip_identity_over_sizes(plaintext in prop::collection::vec(any::<u8>(), 0..4096)) {
            let cipher = ChaCha20Poly1305Cipher::new([5u8; 32]);
            let sealed = cipher.encrypt(&plaintext).expect("should encrypt");
            let decrypted = cipher.decrypt(&sealed).expect("should decrypt");
            prop_assert_eq!(decrypted, plaintext);
        }
    }
}
