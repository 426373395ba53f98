//! Builder for [`ClientConn`].

use crate::client::ClientConn;
use crate::frame::DEFAULT_MAX_RECEIVE_MESSAGE_SIZE;
use crate::transport::TransportProvider;

/// Builder for creating a [`ClientConn`].
///
/// # Example
///
/// ```ignore
/// use wirecall_client::ClientConn;
///
/// let conn = ClientConn::builder("localhost:50051", pool)
///     .fail_fast(true)
///     .max_receive_message_size(16 * 1024 * 1024)
///     .build();
/// ```
#[derive(Debug)]
pub struct ClientConnBuilder<P> {
    /// `host:port` address of the server.
    target: String,
    /// Source of ready transports.
    provider: P,
    /// Whether calls give up on the first connection error.
    fail_fast: bool,
    /// Largest response message accepted, in bytes.
    max_receive_message_size: usize,
}

impl<P: TransportProvider> ClientConnBuilder<P> {
    pub fn new<S: Into<String>>(target: S, provider: P) -> Self {
        Self {
            target: target.into(),
            provider,
            fail_fast: false,
            max_receive_message_size: DEFAULT_MAX_RECEIVE_MESSAGE_SIZE,
        }
    }

    /// Set the fail-fast default for every call on this connection.
    ///
    /// Individual calls can still override it with the
    /// [`FailFast`](crate::FailFast) option. Defaults to `false`: calls keep
    /// moving on to other transports until one works or the call context is
    /// done.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Limit the size of a single response message.
    ///
    /// Larger messages fail the call with `ResourceExhausted`. Defaults to
    /// 4 MiB.
    pub fn max_receive_message_size(mut self, limit: usize) -> Self {
        self.max_receive_message_size = limit;
        self
    }

    pub fn build(self) -> ClientConn<P> {
        ClientConn::from_parts(
            self.target,
            self.provider,
            self.fail_fast,
            self.max_receive_message_size,
        )
    }
}
