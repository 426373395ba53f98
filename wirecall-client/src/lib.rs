//! Unary call invocation for wirecall.
//!
//! This crate drives a single request/response call over pluggable
//! transports: it picks a ready transport, sends the request, reads the
//! reply and reports exactly one outcome. Transport-level failures are
//! retried on another transport; everything else is reported to the caller
//! as a [`Status`].
//!
//! ## Features
//!
//! - Retry on connection errors, unbounded except by the call context
//! - Per-connection and per-call fail-fast
//! - Call options with `before`/`after` hooks that always run
//! - Header and trailer capture
//! - Round-robin, wait-for-ready [`TransportPool`]
//! - gzip response decompression (`gzip` feature)
//! - `tracing` spans and events (`tracing` feature, on by default)
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wirecall_client::{CallContext, CaptureTrailer, ClientConn, MetadataSlot, TransportPool};
//!
//! let pool = TransportPool::new();
//! pool.add(Arc::new(my_transport), true);
//! let conn = ClientConn::new("localhost:50051", pool);
//!
//! let trailer = MetadataSlot::new();
//! let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
//! let reply: EchoReply = conn
//!     .invoke(&ctx, "/echo.Echo/Say", &request, &[&CaptureTrailer::new(&trailer)])
//!     .await?;
//!
//! println!("cost: {:?}", trailer.get().get("x-cost"));
//! ```
//!
//! ## Errors
//!
//! Collaborators report [`ClientError`]. Only [`ClientError::Connection`] is
//! retried; the rest end the call and are converted once into a [`Status`]:
//! status-shaped errors keep their code and everything else becomes
//! `Internal`, a connection error keeping only its bare description.

mod builder;
mod classify;
mod client;
mod config;
mod context;
mod error;
mod frame;
mod invoke;
mod metadata;
mod pool;
mod session;
mod transport;

pub use builder::ClientConnBuilder;
pub use classify::{is_connection_error, status_outcome, to_status};
pub use client::ClientConn;
pub use config::{
    CallConfig, CallOption, CaptureHeader, CaptureTrailer, FailFast, FnOption, MetadataSlot,
};
pub use context::CallContext;
pub use error::{ClientError, ConnectionError};
pub use frame::{DEFAULT_MAX_RECEIVE_MESSAGE_SIZE, decode, encode};
pub use invoke::invoke;
pub use metadata::Metadata;
pub use pool::TransportPool;
pub use transport::{CallHeader, ClientStream, RetryCursor, Transport, TransportProvider, WriteOptions};

// Re-export core types callers need to inspect outcomes.
pub use wirecall_core::{Code, CompressionEncoding, ErrorDetail, Status};
