//! Message encoding and response frame reading.
//!
//! Requests are encoded with prost and wrapped in a single envelope.
//! Responses arrive as arbitrary byte chunks; [`MessageReader`] reassembles
//! envelopes from them and yields one payload per message.

use bytes::{Buf, Bytes, BytesMut};
use prost::Message;
use wirecall_core::{
    CompressionEncoding, ENVELOPE_HEADER_SIZE, EnvelopeError, compress_payload,
    parse_envelope_header, process_envelope_payload, wrap_envelope,
};

use crate::ClientError;
use crate::transport::ClientStream;

/// Default upper bound on a single received message.
pub const DEFAULT_MAX_RECEIVE_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Encode `msg` into one enveloped frame using `encoding`.
pub fn encode<T: Message>(msg: &T, encoding: CompressionEncoding) -> Result<Bytes, ClientError> {
    let mut buf = Vec::with_capacity(msg.encoded_len());
    msg.encode(&mut buf)
        .map_err(|e| ClientError::Encode(format!("protobuf encoding failed: {}", e)))?;

    if buf.len() > u32::MAX as usize {
        return Err(ClientError::Encode(format!(
            "message too large to frame: {} bytes",
            buf.len()
        )));
    }

    let (payload, compressed) = compress_payload(Bytes::from(buf), encoding)?;
    Ok(Bytes::from(wrap_envelope(&payload, compressed)))
}

/// Decode one message payload.
pub fn decode<T: Message + Default>(payload: &[u8]) -> Result<T, ClientError> {
    T::decode(payload).map_err(|e| ClientError::Decode(format!("protobuf decoding failed: {}", e)))
}

/// Reads enveloped messages from a [`ClientStream`] until it is exhausted.
pub(crate) struct MessageReader<'s, S> {
    stream: &'s mut S,
    buffer: BytesMut,
    encoding: CompressionEncoding,
    max_message_size: usize,
    finished: bool,
}

impl<'s, S: ClientStream> MessageReader<'s, S> {
    pub(crate) fn new(
        stream: &'s mut S,
        encoding: CompressionEncoding,
        max_message_size: usize,
    ) -> Self {
        Self {
            stream,
            buffer: BytesMut::new(),
            encoding,
            max_message_size,
            finished: false,
        }
    }

    /// Next message payload, or `Ok(None)` once the stream ended cleanly.
    ///
    /// A stream that ends in the middle of an envelope is a protocol error.
    pub(crate) async fn next_message(&mut self) -> Result<Option<Bytes>, ClientError> {
        loop {
            if let Some(payload) = self.take_message()? {
                return Ok(Some(payload));
            }
            if self.finished {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ClientError::Protocol(format!(
                    "stream ended inside a message: {} bytes left over",
                    self.buffer.len()
                )));
            }
            match self.stream.recv_data().await? {
                Some(chunk) => self.buffer.extend_from_slice(&chunk),
                None => self.finished = true,
            }
        }
    }

    fn take_message(&mut self) -> Result<Option<Bytes>, ClientError> {
        if self.buffer.len() < ENVELOPE_HEADER_SIZE {
            return Ok(None);
        }

        let (flags, length) = parse_envelope_header(&self.buffer)?;
        let length = length as usize;
        if length > self.max_message_size {
            return Err(EnvelopeError::MessageTooLarge {
                actual: length,
                limit: self.max_message_size,
            }
            .into());
        }
        if self.buffer.len() < ENVELOPE_HEADER_SIZE + length {
            return Ok(None);
        }

        self.buffer.advance(ENVELOPE_HEADER_SIZE);
        let payload = self.buffer.split_to(length).freeze();
        let message =
            process_envelope_payload(flags, payload, self.encoding, self.max_message_size)?;
        Ok(Some(message))
    }
}
