//! Call context: cancellation and deadline for one invocation.
//!
//! The invocation path owns no timeout of its own. Every blocking collaborator
//! call (transport selection, header and frame reads) is expected to observe
//! the [`CallContext`] it is handed and return promptly once it is done.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wirecall_core::Code;

use crate::ClientError;

/// Cancellation token plus optional deadline.
///
/// Cloning shares the same cancellation state. [`CallContext::child`] derives
/// a context that is cancelled with its parent but can be cancelled on its
/// own.
///
/// ```ignore
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
/// let reply: EchoReply = conn.invoke(&ctx, "/echo.Echo/Say", &request, &[]).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never done unless cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a deadline `timeout` from now. An earlier existing deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// The error a collaborator should report once the context is done.
    ///
    /// `None` while the context is still live.
    pub fn err(&self) -> Option<ClientError> {
        if self.is_cancelled() {
            return Some(ClientError::new(Code::Canceled, "context canceled"));
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(ClientError::new(
                Code::DeadlineExceeded,
                "context deadline exceeded",
            )),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Run `fut` until it completes or the context is done, whichever is
    /// first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            _ = self.done() => Err(self.done_error()),
            result = fut => result,
        }
    }

    fn done_error(&self) -> ClientError {
        self.err()
            .unwrap_or_else(|| ClientError::new(Code::Canceled, "context canceled"))
    }
}
