//! Length-prefixed message framing.
//!
//! Every message on a stream travels in an envelope:
//!
//! ```text
//! [flags:1][length:4 big-endian][payload:length]
//! ```

use bytes::Bytes;
use std::io;

use crate::compression::CompressionEncoding;
use crate::error::EnvelopeError;

/// Envelope flags.
pub mod envelope_flags {
    /// Uncompressed message.
    pub const MESSAGE: u8 = 0x00;
    /// Compressed message.
    pub const COMPRESSED: u8 = 0x01;
}

/// Envelope header size (flags + length).
pub const ENVELOPE_HEADER_SIZE: usize = 5;

/// Wrap a payload in an envelope.
pub fn wrap_envelope(payload: &[u8], compressed: bool) -> Vec<u8> {
    let flags = if compressed {
        envelope_flags::COMPRESSED
    } else {
        envelope_flags::MESSAGE
    };

    let mut frame = Vec::with_capacity(ENVELOPE_HEADER_SIZE + payload.len());
    frame.push(flags);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Parse an envelope header, returning `(flags, length)`.
pub fn parse_envelope_header(data: &[u8]) -> Result<(u8, u32), EnvelopeError> {
    if data.len() < ENVELOPE_HEADER_SIZE {
        return Err(EnvelopeError::IncompleteHeader {
            expected: ENVELOPE_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let flags = data[0];
    let length = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    Ok((flags, length))
}

/// Validate the flags of a received envelope and decompress its payload.
///
/// A compressed frame is only accepted when the peer announced a
/// non-identity `encoding`, and it may expand to at most `max_size` bytes.
pub fn process_envelope_payload(
    flags: u8,
    payload: Bytes,
    encoding: CompressionEncoding,
    max_size: usize,
) -> Result<Bytes, EnvelopeError> {
    match flags {
        envelope_flags::MESSAGE => Ok(payload),
        envelope_flags::COMPRESSED => {
            let Some(codec) = encoding.codec() else {
                return Err(EnvelopeError::UnexpectedCompression);
            };
            codec.decompress(&payload, max_size).map_err(|e| match e.kind() {
                io::ErrorKind::FileTooLarge => {
                    EnvelopeError::DecompressedTooLarge { limit: max_size }
                }
                _ => EnvelopeError::Decompression(e.to_string()),
            })
        }
        other => Err(EnvelopeError::InvalidFlags(other)),
    }
}

/// Compress a payload with `encoding`, returning `(bytes, was_compressed)`.
pub fn compress_payload(
    payload: Bytes,
    encoding: CompressionEncoding,
) -> Result<(Bytes, bool), EnvelopeError> {
    let Some(codec) = encoding.codec() else {
        return Ok((payload, false));
    };

    let compressed = codec
        .compress(&payload)
        .map_err(|e| EnvelopeError::Compression(e.to_string()))?;
    Ok((compressed, true))
}
