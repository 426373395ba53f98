//! The unary invocation loop.
//!
//! One call runs as a sequence of attempts. Each attempt asks the provider for
//! a transport, sends the request on a fresh stream and reads the response.
//! Connection errors move on to the next attempt; anything else ends the call.
//! There is no retry budget: a call keeps retrying until it succeeds, fails
//! terminally, or the provider gives up (usually because the call context is
//! done).
//!
//! # Error attribution
//!
//! Once an attempt has failed with a connection error, that error is kept as
//! the call's cause. If a later attempt fails in its send phase, or the
//! provider can no longer hand out a transport, the caller sees the earlier
//! connection error rather than the later failure. Receive-phase failures are
//! always reported as-is. This precedence is inherited behavior and is kept
//! exactly, even where the later error might be the more useful one.

use prost::Message;
use wirecall_core::Status;

use crate::ClientError;
use crate::classify::{is_connection_error, status_outcome, to_status};
use crate::client::{ClientConn, split_host};
use crate::config::{CallConfig, CallOption, OptionGuard};
use crate::context::CallContext;
use crate::session::{recv_response, send_request};
use crate::transport::{
    CallHeader, ClientStream, RetryCursor, Transport, TransportProvider, WriteOptions,
};

/// Perform a unary call of `method` on `conn`.
///
/// `options` hooks run around the call: every `before` in order before any
/// transport is contacted, every `after` in order once the call is over,
/// whatever the outcome.
///
/// Returns the reply, or the single classified status describing why the call
/// failed.
pub async fn invoke<P, Req, Res>(
    ctx: &CallContext,
    method: &str,
    request: &Req,
    conn: &ClientConn<P>,
    options: &[&dyn CallOption],
) -> Result<Res, Status>
where
    P: TransportProvider,
    Req: Message,
    Res: Message + Default,
{
    let call = run_call(ctx, method, request, conn, options);

    #[cfg(feature = "tracing")]
    let call = {
        use tracing::Instrument;
        call.instrument(tracing::info_span!(
            "rpc.call",
            rpc.method = %method,
            rpc.type = "unary",
            otel.kind = "client",
        ))
    };

    call.await
}

async fn run_call<P, Req, Res>(
    ctx: &CallContext,
    method: &str,
    request: &Req,
    conn: &ClientConn<P>,
    options: &[&dyn CallOption],
) -> Result<Res, Status>
where
    P: TransportProvider,
    Req: Message,
    Res: Message + Default,
{
    let mut guard = OptionGuard::new(options, CallConfig::new(conn.fail_fast()));
    guard.run_before().map_err(fail)?;

    let host = split_host(conn.target()).map_err(fail)?;
    let header = CallHeader::new(host, method);

    let mut cursor = RetryCursor::INITIAL;
    let mut last_err: Option<ClientError> = None;
    let mut attempt: u32 = 0;

    loop {
        if guard.config().fail_fast() {
            if let Some(err) = last_err.take() {
                return Err(fail(err));
            }
        }

        attempt += 1;
        let (transport, next) = match conn.provider().next(ctx, cursor).await {
            Ok(picked) => picked,
            Err(err) => {
                return Err(match last_err {
                    Some(prior) => fail(prior),
                    None => failed(Status::internal(err.to_string())),
                });
            }
        };
        cursor = next;

        let mut stream =
            match send_request(ctx, &*transport, &header, WriteOptions::UNARY, request).await {
                Ok(stream) => stream,
                Err(err) if is_connection_error(&err) => {
                    retrying(attempt, &err);
                    last_err = Some(err);
                    continue;
                }
                Err(err) => return Err(fail(last_err.unwrap_or(err))),
            };

        let received = recv_response::<_, Res>(
            &mut stream,
            guard.config_mut(),
            conn.max_receive_message_size(),
        )
        .await;

        match received {
            // The stream is dropped without close_stream; the transport owns
            // cleanup of a broken connection.
            Err(err) if is_connection_error(&err) => {
                retrying(attempt, &err);
                last_err = Some(err);
            }
            Err(err) => {
                transport.close_stream(stream, Some(&err));
                return Err(fail(err));
            }
            Ok(reply) => {
                let code = stream.status_code();
                let desc = stream.status_desc();
                transport.close_stream(stream, None);
                return match status_outcome(code, &desc) {
                    Ok(()) => Ok(reply),
                    Err(status) => Err(failed(status)),
                };
            }
        }
    }
}

fn fail(err: ClientError) -> Status {
    failed(to_status(err))
}

fn failed(status: Status) -> Status {
    #[cfg(feature = "tracing")]
    tracing::debug!(code = %status.code(), message = ?status.message(), "call failed");
    status
}

#[allow(unused_variables)]
fn retrying(attempt: u32, err: &ClientError) {
    #[cfg(feature = "tracing")]
    tracing::debug!(attempt, error = %err, "retrying after connection error");
}
