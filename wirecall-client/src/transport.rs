//! Collaborator interfaces consumed by the invocation path.
//!
//! - [`TransportProvider`]: hands out ready transports (a connection pool)
//! - [`Transport`]: a live connection able to host many concurrent streams
//! - [`ClientStream`]: one request/response exchange on a transport
//!
//! Implementations must be safe for concurrent use across invocations; the
//! invocation path adds no locking of its own. Every blocking method must
//! return promptly with an error once the [`CallContext`] it was given is
//! done.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use wirecall_core::Code;

use crate::ClientError;
use crate::context::CallContext;
use crate::metadata::Metadata;

/// Host and method of a call; identical for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHeader {
    pub host: String,
    pub method: String,
}

impl CallHeader {
    pub fn new(host: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            method: method.into(),
        }
    }
}

/// How a write is handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// The write completes the outbound message stream.
    pub last: bool,
    /// The transport may buffer the write.
    pub delay: bool,
}

impl WriteOptions {
    /// Unary requests are a single, immediate, final write.
    pub const UNARY: WriteOptions = WriteOptions {
        last: true,
        delay: false,
    };
}

/// Opaque position a provider threads through the attempts of one call.
///
/// A provider uses it to avoid re-offering a transport that just failed and
/// to keep its own rotation or backoff state across retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RetryCursor(u64);

impl RetryCursor {
    /// The cursor for the first attempt of a call.
    pub const INITIAL: RetryCursor = RetryCursor(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_initial(&self) -> bool {
        self.0 == 0
    }
}

/// The receiving half of one attempt.
pub trait ClientStream: Send {
    /// Wait for the peer's initial header metadata.
    fn header(&mut self) -> impl Future<Output = Result<Metadata, ClientError>> + Send;

    /// Next chunk of response bytes; `Ok(None)` once the peer has finished.
    ///
    /// Chunk boundaries carry no meaning; message envelopes may span chunks.
    fn recv_data(&mut self) -> impl Future<Output = Result<Option<Bytes>, ClientError>> + Send;

    /// Trailer metadata, available once `recv_data` returned `Ok(None)`.
    fn trailer(&self) -> Metadata;

    /// Terminal status code sent by the peer.
    fn status_code(&self) -> Code;

    /// Terminal status description sent by the peer.
    fn status_desc(&self) -> String;
}

/// A live connection that multiplexes streams.
pub trait Transport: Send + Sync {
    type Stream: ClientStream;

    /// Open a new stream for `header`.
    fn new_stream(
        &self,
        ctx: &CallContext,
        header: &CallHeader,
    ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send;

    /// Write `data` to `stream`.
    fn write(
        &self,
        stream: &mut Self::Stream,
        data: Bytes,
        opts: WriteOptions,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Release `stream`. `err` is the terminal error of the attempt, if any,
    /// for the transport's own bookkeeping.
    fn close_stream(&self, stream: Self::Stream, err: Option<&ClientError>);
}

/// A source of ready transports, typically a connection pool.
pub trait TransportProvider: Send + Sync {
    type Transport: Transport;

    /// Wait for a usable transport.
    ///
    /// Returns the transport and the cursor to pass on the next attempt of
    /// the same call, or an error if none became ready before `ctx` was done.
    fn next(
        &self,
        ctx: &CallContext,
        cursor: RetryCursor,
    ) -> impl Future<Output = Result<(Arc<Self::Transport>, RetryCursor), ClientError>> + Send;
}
