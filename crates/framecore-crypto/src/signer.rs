//! Keyed authentication tags over the canonical signed bytes.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

/// Produces and verifies keyed authentication tags.
///
/// Implementations must use a constant-time comparison in [`Signer::verify`]
/// so tag comparison cannot leak timing information about a correct prefix.
pub trait Signer: Send + Sync {
    /// Computes the authentication tag over `bytes`.
    fn sign(&self, bytes: &[u8]) -> Vec<u8>;

    /// Verifies `tag` against the tag `bytes` would produce. Constant-time.
    fn verify(&self, bytes: &[u8], tag: &[u8]) -> bool;
}

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer. The minimum signer this crate provides; other keyed
/// MACs can implement [`Signer`] the same way.
#[derive(ZeroizeOnDrop)]
pub struct HmacSha256Signer {
    key: Vec<u8>,
}

impl HmacSha256Signer {
    /// Builds a signer from a key of any non-zero length (HMAC accepts keys
    /// of arbitrary size; short keys are hashed internally by the MAC).
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }
}

impl Signer for HmacSha256Signer {
    fn sign(&self, bytes: &[u8]) -> Vec<u8> {
        #[allow(clippy::expect_used)]
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(bytes);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, bytes: &[u8], tag: &[u8]) -> bool {
        #[allow(clippy::expect_used)]
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(bytes);
        mac.verify_slice(tag).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let signer = HmacSha256Signer::new(b"a signing key".to_vec());
        let tag = signer.sign(b"some canonical bytes");
        assert!(signer.verify(b"some canonical bytes", &tag));
    }

    #[test]
    fn tampered_bytes_fail_verification() {
        let signer = HmacSha256Signer::new(b"a signing key".to_vec());
        let tag = signer.sign(b"some canonical bytes");
        assert!(!signer.verify(b"some OTHER canonical bytes", &tag));
    }

    #[test]
    fn tampered_tag_fails_verification() {
        let signer = HmacSha256Signer::new(b"a signing key".to_vec());
        let mut tag = signer.sign(b"some canonical bytes");
        tag[0] ^= 0xff;
        assert!(!signer.verify(b"some canonical bytes", &tag));
    }

    #[test]
    fn different_keys_produce_different_tags() {
        let a = HmacSha256Signer::new(b"key-a".to_vec());
        let b = HmacSha256Signer::new(b"key-b".to_vec());
        assert_ne!(a.sign(b"same bytes"), b.sign(b"same bytes"));
    }
}
