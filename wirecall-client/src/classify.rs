//! Error classification.
//!
//! Separates the two failure domains of a call:
//!
//! - transport failures ([`ClientError::Connection`]): retryable, absorbed by
//!   the invocation loop
//! - everything else: terminal, turned into a caller-facing [`Status`] once
//!
//! A status-shaped error keeps its code, description and details. Every
//! other kind becomes `Internal`. A connection error that ends up reported
//! (fail-fast, or retries cut short by the call context) carries only the
//! transport's own description.

use wirecall_core::{Code, Status};

use crate::ClientError;

/// Whether `err` is a transport-level failure that may be retried.
pub fn is_connection_error(err: &ClientError) -> bool {
    err.is_connection_error()
}

/// Convert any attempt error into the status reported to the caller.
pub fn to_status(err: ClientError) -> Status {
    match err {
        ClientError::Status {
            code,
            message,
            details,
        } => {
            let status = match message {
                Some(message) => Status::new(code, message),
                None => Status::from_code(code),
            };
            status.with_details(details)
        }
        ClientError::Connection(conn) => Status::internal(conn.desc()),
        other => Status::internal(other.to_string()),
    }
}

impl From<ClientError> for Status {
    fn from(err: ClientError) -> Self {
        to_status(err)
    }
}

/// Map a stream's terminal status to the call outcome.
///
/// `Ok` yields `Ok(())`; any other code yields a [`Status`] carrying that code
/// and description.
pub fn status_outcome(code: Code, desc: &str) -> Result<(), Status> {
    if code.is_ok() {
        return Ok(());
    }
    Err(Status::new(code, desc))
}
