//! Client-side error types.
//!
//! [`ClientError`] is what transports, streams and the session report. It is
//! never handed to the caller directly: the classifier in
//! [`classify`](crate::classify) turns it into a [`Status`](wirecall_core::Status).

use wirecall_core::{Code, EnvelopeError, ErrorDetail};

/// A failure to reach or use a transport.
///
/// This is the only error kind the invocation loop retries on. Transports
/// return it when the attempt never reached the peer or the connection broke
/// underneath the stream.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("connection error: {desc}")]
pub struct ConnectionError {
    desc: String,
}

impl ConnectionError {
    pub fn new<S: Into<String>>(desc: S) -> Self {
        Self { desc: desc.into() }
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }
}

/// Errors raised while performing a call attempt.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure; the attempt may be retried on another transport.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A status-shaped error, e.g. a stream reset by the peer with a code.
    #[error("{code}: {}", .message.as_deref().unwrap_or_default())]
    Status {
        code: Code,
        message: Option<String>,
        details: Vec<ErrorDetail>,
    },

    /// Request message encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Response message decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed frames or unexpected data on the stream.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Any other failure inside the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Create a status error with a code and description.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        ClientError::Status {
            code,
            message: Some(message.into()),
            details: vec![],
        }
    }

    /// Create a status error with just a code.
    pub fn from_code(code: Code) -> Self {
        ClientError::Status {
            code,
            message: None,
            details: vec![],
        }
    }

    /// Shorthand for `ClientError::Connection(ConnectionError::new(desc))`.
    pub fn connection<S: Into<String>>(desc: S) -> Self {
        ClientError::Connection(ConnectionError::new(desc))
    }

    /// Whether this is a transport-level failure.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// The code this error is reported with once classified.
    ///
    /// - Status: its own code
    /// - Connection/Encode/Decode/Protocol/Internal: `Internal`
    pub fn code(&self) -> Code {
        match self {
            ClientError::Status { code, .. } => *code,
            ClientError::Connection(_)
            | ClientError::Encode(_)
            | ClientError::Decode(_)
            | ClientError::Protocol(_)
            | ClientError::Internal(_) => Code::Internal,
        }
    }

    /// Human-readable description, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            ClientError::Connection(err) => Some(err.desc()),
            ClientError::Encode(msg)
            | ClientError::Decode(msg)
            | ClientError::Protocol(msg)
            | ClientError::Internal(msg) => Some(msg),
        }
    }

    /// Error details (only for the Status variant).
    pub fn details(&self) -> &[ErrorDetail] {
        match self {
            ClientError::Status { details, .. } => details,
            _ => &[],
        }
    }
}

impl From<EnvelopeError> for ClientError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::MessageTooLarge { .. } | EnvelopeError::DecompressedTooLarge { .. } => {
                ClientError::new(Code::ResourceExhausted, err.to_string())
            }
            EnvelopeError::Decompression(msg) => {
                ClientError::Decode(format!("decompression failed: {}", msg))
            }
            EnvelopeError::Compression(msg) => {
                ClientError::Encode(format!("compression failed: {}", msg))
            }
            EnvelopeError::IncompleteHeader { .. }
            | EnvelopeError::InvalidFlags(_)
            | EnvelopeError::UnexpectedCompression => ClientError::Protocol(err.to_string()),
        }
    }
}
