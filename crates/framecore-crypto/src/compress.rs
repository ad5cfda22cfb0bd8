//! Named compression strategies, selected by configuration.

use std::{collections::HashMap, sync::Arc, sync::LazyLock};

use crate::error::{CryptoError, Result};

/// A named, stateless compression strategy.
pub trait Compressor: Send + Sync {
    /// Registry name this implementation is installed under.
    fn name(&self) -> &'static str;

    /// Compresses `bytes`.
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses bytes produced by [`Self::compress`].
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Identity codec, always registered under `"none"`.
pub struct NoneCompressor;

impl Compressor for NoneCompressor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Fast codec, registered under `"snappy"`.
pub struct SnappyCompressor;

impl Compressor for SnappyCompressor {
    fn name(&self) -> &'static str {
        "snappy"
    }

    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(bytes)
            .map_err(|err| CryptoError::CompressFailed(err.to_string()))
    }

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(bytes)
            .map_err(|err| CryptoError::DecompressFailed(err.to_string()))
    }
}

/// Strong codec, registered under `"zstd"`.
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    /// Default compression level (3, zstd's own default).
    pub const DEFAULT_LEVEL: i32 = 3;

    /// Builds a codec at the given compression level.
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        zstd::encode_all(bytes, self.level).map_err(|err| CryptoError::CompressFailed(err.to_string()))
    }

    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        zstd::decode_all(bytes).map_err(|err| CryptoError::DecompressFailed(err.to_string()))
    }
}

/// Process-global, eagerly-initialised, read-mostly mapping from codec name
/// to a ready compressor instance. `"none"` is always present; the registry
/// additionally carries `"snappy"` (fast) and `"zstd"` (strong).
static REGISTRY: LazyLock<HashMap<&'static str, Arc<dyn Compressor>>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Arc<dyn Compressor>> = HashMap::new();
    m.insert("none", Arc::new(NoneCompressor));
    m.insert("snappy", Arc::new(SnappyCompressor));
    m.insert("zstd", Arc::new(ZstdCompressor::default()));
    m
});

/// Looks up a compressor by registry name.
#[must_use]
pub fn lookup(name: &str) -> Option<Arc<dyn Compressor>> {
    REGISTRY.get(name).cloned()
}

/// Looks up a compressor by registry name, failing with
/// [`CryptoError::UnknownCompressor`] if it is not registered.
pub fn require(name: &str) -> Result<Arc<dyn Compressor>> {
    lookup(name).ok_or_else(|| CryptoError::UnknownCompressor(name.to_string()))
}
