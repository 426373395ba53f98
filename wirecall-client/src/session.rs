//! One attempt of a unary call: send the request on a transport, then read
//! the response back from the stream.

use prost::Message;
use wirecall_core::{Code, CompressionEncoding, ENCODING_HEADER};

use crate::ClientError;
use crate::config::CallConfig;
use crate::context::CallContext;
use crate::frame::{MessageReader, decode, encode};
use crate::transport::{CallHeader, ClientStream, Transport, WriteOptions};

/// Open a stream on `transport` and write the encoded request to it.
///
/// On failure after the stream was opened, the stream is closed here unless
/// the failure is a connection error, in which case the transport already
/// owns its cleanup and the stream is only dropped.
pub(crate) async fn send_request<T, Req>(
    ctx: &CallContext,
    transport: &T,
    header: &CallHeader,
    opts: WriteOptions,
    request: &Req,
) -> Result<T::Stream, ClientError>
where
    T: Transport,
    Req: Message,
{
    let mut stream = transport.new_stream(ctx, header).await?;

    // Requests on this path are never compressed.
    let written = match encode(request, CompressionEncoding::Identity) {
        Ok(data) => transport.write(&mut stream, data, opts).await,
        Err(err) => Err(err),
    };

    match written {
        Ok(()) => Ok(stream),
        Err(err) => {
            if !err.is_connection_error() {
                transport.close_stream(stream, Some(&err));
            }
            Err(err)
        }
    }
}

/// Read header metadata, every response frame and trailer metadata from
/// `stream`, storing the metadata into `config`.
///
/// Frames are drained until the stream is exhausted; each decoded frame
/// replaces the previous one, so the reply is the last message received.
pub(crate) async fn recv_response<S, Res>(
    stream: &mut S,
    config: &mut CallConfig,
    max_message_size: usize,
) -> Result<Res, ClientError>
where
    S: ClientStream,
    Res: Message + Default,
{
    config.header = stream.header().await?;

    let announced = config.header.get(ENCODING_HEADER);
    let encoding = CompressionEncoding::from_header(announced).ok_or_else(|| {
        ClientError::new(
            Code::Unimplemented,
            format!("unsupported response encoding: {:?}", announced),
        )
    })?;

    let mut reply = Res::default();
    let mut reader = MessageReader::new(stream, encoding, max_message_size);
    while let Some(payload) = reader.next_message().await? {
        #[cfg(feature = "tracing")]
        tracing::trace!(bytes = payload.len(), "received response message");
        reply = decode(&payload)?;
    }

    config.trailer = stream.trailer();
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::metadata::Metadata;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Note {
        #[prost(string, tag = "1")]
        text: String,
    }

    #[derive(Debug)]
    struct ScriptedStream {
        header: Option<Result<Metadata, ClientError>>,
        chunks: VecDeque<Result<Bytes, ClientError>>,
        trailer: Metadata,
    }

    impl ClientStream for ScriptedStream {
        async fn header(&mut self) -> Result<Metadata, ClientError> {
            self.header.take().unwrap_or_else(|| Ok(Metadata::empty()))
        }

        async fn recv_data(&mut self) -> Result<Option<Bytes>, ClientError> {
            self.chunks.pop_front().transpose()
        }

        fn trailer(&self) -> Metadata {
            self.trailer.clone()
        }

        fn status_code(&self) -> Code {
            Code::Ok
        }

        fn status_desc(&self) -> String {
            String::new()
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        open_err: Option<ClientError>,
        write_err: Option<ClientError>,
        written: Mutex<Vec<(Bytes, WriteOptions)>>,
        closed: Mutex<Vec<Option<String>>>,
    }

    impl Transport for RecordingTransport {
        type Stream = ScriptedStream;

        async fn new_stream(
            &self,
            _ctx: &CallContext,
            _header: &CallHeader,
        ) -> Result<ScriptedStream, ClientError> {
            if let Some(err) = &self.open_err {
                return Err(err.clone());
            }
            Ok(ScriptedStream {
                header: None,
                chunks: VecDeque::new(),
                trailer: Metadata::empty(),
            })
        }

        async fn write(
            &self,
            _stream: &mut ScriptedStream,
            data: Bytes,
            opts: WriteOptions,
        ) -> Result<(), ClientError> {
            if let Some(err) = &self.write_err {
                return Err(err.clone());
            }
            self.written.lock().unwrap().push((data, opts));
            Ok(())
        }

        fn close_stream(&self, _stream: ScriptedStream, err: Option<&ClientError>) {
            self.closed
                .lock()
                .unwrap()
                .push(err.map(|e| e.to_string()));
        }
    }

    fn header() -> CallHeader {
        CallHeader::new("localhost", "/notes.Notes/Put")
    }

    fn frame(text: &str) -> Bytes {
        encode(&Note { text: text.into() }, CompressionEncoding::Identity).unwrap()
    }

    #[tokio::test]
    async fn test_send_writes_single_final_frame() {
        let transport = RecordingTransport::default();
        let request = Note { text: "hello".into() };

        send_request(&CallContext::new(), &transport, &header(), WriteOptions::UNARY, &request)
            .await
            .unwrap();

        let written = transport.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, frame("hello"));
        assert_eq!(written[0].1, WriteOptions::UNARY);
        assert!(transport.closed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_open_failure_is_returned_as_is() {
        let transport = RecordingTransport {
            open_err: Some(ClientError::connection("no route")),
            ..Default::default()
        };

        let err = send_request(
            &CallContext::new(),
            &transport,
            &header(),
            WriteOptions::UNARY,
            &Note::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_connection_error());
        assert!(transport.closed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_write_connection_error_leaves_stream_to_transport() {
        let transport = RecordingTransport {
            write_err: Some(ClientError::connection("broken pipe")),
            ..Default::default()
        };

        let err = send_request(
            &CallContext::new(),
            &transport,
            &header(),
            WriteOptions::UNARY,
            &Note::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_connection_error());
        assert!(transport.closed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_write_other_error_closes_stream() {
        let transport = RecordingTransport {
            write_err: Some(ClientError::new(Code::ResourceExhausted, "flow control")),
            ..Default::default()
        };

        let err = send_request(
            &CallContext::new(),
            &transport,
            &header(),
            WriteOptions::UNARY,
            &Note::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), Code::ResourceExhausted);
        let closed = transport.closed.lock().unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].as_deref(), Some("resource_exhausted: flow control"));
    }

    #[tokio::test]
    async fn test_recv_stores_metadata_and_last_frame() {
        let mut stream = ScriptedStream {
            header: Some(Ok(Metadata::from_pairs([("x-server", "a")]))),
            chunks: VecDeque::from([Ok(frame("one")), Ok(frame("two"))]),
            trailer: Metadata::from_pairs([("x-cost", "3")]),
        };
        let mut config = CallConfig::default();

        let reply: Note = recv_response(&mut stream, &mut config, 1024).await.unwrap();

        assert_eq!(reply.text, "two");
        assert_eq!(config.header().get("x-server"), Some("a"));
        assert_eq!(config.trailer().get("x-cost"), Some("3"));
    }

    #[tokio::test]
    async fn test_recv_no_frames_yields_default_reply() {
        let mut stream = ScriptedStream {
            header: None,
            chunks: VecDeque::new(),
            trailer: Metadata::empty(),
        };
        let mut config = CallConfig::default();

        let reply: Note = recv_response(&mut stream, &mut config, 1024).await.unwrap();
        assert_eq!(reply, Note::default());
    }

    #[tokio::test]
    async fn test_recv_header_failure_aborts() {
        let mut stream = ScriptedStream {
            header: Some(Err(ClientError::connection("goaway"))),
            chunks: VecDeque::from([Ok(frame("never read"))]),
            trailer: Metadata::from_pairs([("x-t", "1")]),
        };
        let mut config = CallConfig::default();

        let err = recv_response::<_, Note>(&mut stream, &mut config, 1024)
            .await
            .unwrap_err();

        assert!(err.is_connection_error());
        assert_eq!(stream.chunks.len(), 1);
        assert!(config.trailer().is_empty());
    }

    #[tokio::test]
    async fn test_recv_decode_failure_aborts() {
        let mut stream = ScriptedStream {
            header: None,
            chunks: VecDeque::from([Ok(Bytes::from(wirecall_core::wrap_envelope(
                &[0xff, 0xff],
                false,
            )))]),
            trailer: Metadata::from_pairs([("x-t", "1")]),
        };
        let mut config = CallConfig::default();

        let err = recv_response::<_, Note>(&mut stream, &mut config, 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
        assert!(config.trailer().is_empty());
    }

    #[cfg(feature = "gzip")]
    #[tokio::test]
    async fn test_recv_gzip_response() {
        let compressed =
            encode(&Note { text: "squeezed".into() }, CompressionEncoding::Gzip).unwrap();
        let mut stream = ScriptedStream {
            header: Some(Ok(Metadata::from_pairs([(ENCODING_HEADER, "gzip")]))),
            chunks: VecDeque::from([Ok(compressed)]),
            trailer: Metadata::empty(),
        };
        let mut config = CallConfig::default();

        let reply: Note = recv_response(&mut stream, &mut config, 1024).await.unwrap();
        assert_eq!(reply.text, "squeezed");
    }

    #[tokio::test]
    async fn test_recv_unsupported_encoding() {
        let mut stream = ScriptedStream {
            header: Some(Ok(Metadata::from_pairs([(ENCODING_HEADER, "snappy")]))),
            chunks: VecDeque::new(),
            trailer: Metadata::empty(),
        };
        let mut config = CallConfig::default();

        let err = recv_response::<_, Note>(&mut stream, &mut config, 1024)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unimplemented);
    }
}
