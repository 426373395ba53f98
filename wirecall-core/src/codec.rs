//! Compression codec trait and implementations.
//!
//! - [`IdentityCodec`]: Pass-through
//! - [`GzipCodec`]: Gzip compression (requires the `gzip` feature)

use bytes::Bytes;
use std::io;
use std::sync::Arc;

#[cfg(feature = "gzip")]
use flate2::Compression as GzipLevel;
#[cfg(feature = "gzip")]
use flate2::read::GzDecoder;
#[cfg(feature = "gzip")]
use flate2::write::GzEncoder;
#[cfg(feature = "gzip")]
use std::io::{Read, Write};

/// Per-message compression codec.
pub trait Codec: Send + Sync + 'static {
    /// The encoding name carried in metadata (e.g. "gzip").
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> io::Result<Bytes>;

    /// Decompress `data`, producing at most `limit` bytes.
    ///
    /// Output beyond `limit` fails with [`io::ErrorKind::FileTooLarge`]
    /// without being buffered.
    fn decompress(&self, data: &[u8], limit: usize) -> io::Result<Bytes>;
}

fn too_large(limit: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::FileTooLarge,
        format!("decompressed message larger than {} bytes", limit),
    )
}

/// A type-erased, cheaply clonable codec.
#[derive(Clone)]
pub struct BoxedCodec(Arc<dyn Codec>);

impl BoxedCodec {
    pub fn new<C: Codec>(codec: C) -> Self {
        BoxedCodec(Arc::new(codec))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.compress(data)
    }

    pub fn decompress(&self, data: &[u8], limit: usize) -> io::Result<Bytes> {
        self.0.decompress(data, limit)
    }
}

impl std::fmt::Debug for BoxedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedCodec").field(&self.name()).finish()
    }
}

/// Identity codec (no compression).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        Ok(Bytes::copy_from_slice(data))
    }

    fn decompress(&self, data: &[u8], limit: usize) -> io::Result<Bytes> {
        if data.len() > limit {
            return Err(too_large(limit));
        }
        Ok(Bytes::copy_from_slice(data))
    }
}

/// Gzip codec using flate2.
#[cfg(feature = "gzip")]
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    /// Compression level (0-9).
    pub level: u32,
}

#[cfg(feature = "gzip")]
impl Default for GzipCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

#[cfg(feature = "gzip")]
impl Codec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = GzEncoder::new(Vec::new(), GzipLevel::new(self.level.min(9)));
        encoder.write_all(data)?;
        Ok(Bytes::from(encoder.finish()?))
    }

    fn decompress(&self, data: &[u8], limit: usize) -> io::Result<Bytes> {
        // One byte past the limit is enough to tell an oversized message.
        let mut decoder = GzDecoder::new(data).take(limit as u64 + 1);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        if decompressed.len() > limit {
            return Err(too_large(limit));
        }
        Ok(Bytes::from(decompressed))
    }
}
