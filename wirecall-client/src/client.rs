//! Client connection handle.
//!
//! [`ClientConn`] binds a target address to a [`TransportProvider`] and holds
//! the per-connection defaults applied to every call made through it.

use http::uri::Authority;
use prost::Message;
use wirecall_core::Status;

use crate::ClientError;
use crate::builder::ClientConnBuilder;
use crate::config::CallOption;
use crate::context::CallContext;
use crate::transport::TransportProvider;

/// A logical connection to one target, backed by a transport provider.
///
/// # Example
///
/// ```ignore
/// use wirecall_client::{CallContext, ClientConn, TransportPool};
///
/// let pool = TransportPool::new();
/// pool.add(transport, true);
///
/// let conn = ClientConn::builder("localhost:50051", pool)
///     .fail_fast(true)
///     .build();
///
/// let reply: EchoReply = conn
///     .invoke(&CallContext::new(), "/echo.Echo/Say", &request, &[])
///     .await?;
/// ```
#[derive(Debug)]
pub struct ClientConn<P> {
    target: String,
    provider: P,
    fail_fast: bool,
    max_receive_message_size: usize,
}

impl<P: TransportProvider> ClientConn<P> {
    /// Create a connection with default settings.
    pub fn new<S: Into<String>>(target: S, provider: P) -> Self {
        Self::builder(target, provider).build()
    }

    /// Start configuring a connection.
    pub fn builder<S: Into<String>>(target: S, provider: P) -> ClientConnBuilder<P> {
        ClientConnBuilder::new(target, provider)
    }

    pub(crate) fn from_parts(
        target: String,
        provider: P,
        fail_fast: bool,
        max_receive_message_size: usize,
    ) -> Self {
        Self {
            target,
            provider,
            fail_fast,
            max_receive_message_size,
        }
    }

    /// The `host:port` address calls are made to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fail-fast default seeded into every call before option hooks run.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Largest response message accepted, in bytes.
    pub fn max_receive_message_size(&self) -> usize {
        self.max_receive_message_size
    }

    /// Perform a unary call. See [`invoke`](crate::invoke()).
    pub async fn invoke<Req, Res>(
        &self,
        ctx: &CallContext,
        method: &str,
        request: &Req,
        options: &[&dyn CallOption],
    ) -> Result<Res, Status>
    where
        Req: Message,
        Res: Message + Default,
    {
        crate::invoke(ctx, method, request, self, options).await
    }
}

/// Host part of a `host:port` target, used as the call header's host.
///
/// A target without a port is not a usable address.
pub(crate) fn split_host(target: &str) -> Result<String, ClientError> {
    let authority: Authority = target
        .parse()
        .map_err(|e| ClientError::Internal(format!("invalid target {:?}: {}", target, e)))?;

    if authority.port_u16().is_none() {
        return Err(ClientError::Internal(format!(
            "invalid target {:?}: missing port in address",
            target
        )));
    }

    let host = authority.host();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    Ok(host.to_string())
}
