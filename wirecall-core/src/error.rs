//! Status codes and the caller-facing status error.
//!
//! - [`Code`]: Terminal status codes carried by every stream
//! - [`Status`]: Code plus description, the error callers observe
//! - [`ErrorDetail`]: Structured detail attached to a status
//! - [`EnvelopeError`]: Message framing errors

/// Status codes reported by a peer at the end of a stream.
///
/// The numeric values are the ones carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    Ok = 0,
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// Map a wire value to a code. Values outside the known range become
    /// [`Code::Unknown`].
    ///
    /// ```
    /// use wirecall_core::Code;
    ///
    /// assert_eq!(Code::from_u32(5), Code::NotFound);
    /// assert_eq!(Code::from_u32(99), Code::Unknown);
    /// ```
    pub fn from_u32(value: u32) -> Code {
        match value {
            0 => Code::Ok,
            1 => Code::Canceled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }

    /// Whether this code reports success.
    pub fn is_ok(&self) -> bool {
        matches!(self, Code::Ok)
    }

}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured detail attached to a [`Status`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    type_url: String,
    value: Vec<u8>,
}

impl ErrorDetail {
    /// Create a new error detail with a type URL and encoded bytes.
    pub fn new<S: Into<String>>(type_url: S, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Message envelope framing errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// Not enough bytes for an envelope header.
    #[error("incomplete envelope header: expected {expected} bytes, got {actual}")]
    IncompleteHeader { expected: usize, actual: usize },

    /// Unknown flags byte.
    #[error("invalid frame flags: 0x{0:02x}")]
    InvalidFlags(u8),

    /// A frame was flagged compressed but no compression was negotiated.
    #[error("compressed frame received without a negotiated encoding")]
    UnexpectedCompression,

    /// Declared payload length is above the receive limit.
    #[error("received message larger than max ({actual} vs. {limit})")]
    MessageTooLarge { actual: usize, limit: usize },

    /// A compressed payload expands past the receive limit.
    #[error("decompressed message larger than max ({limit})")]
    DecompressedTooLarge { limit: usize },

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("compression failed: {0}")]
    Compression(String),
}

/// Terminal outcome of a call as seen by the caller.
///
/// Carries the status code, an optional human-readable description and any
/// structured details the peer attached.
///
/// ```
/// use wirecall_core::{Code, Status};
///
/// let status = Status::new(Code::NotFound, "user not found");
/// assert_eq!(status.code(), Code::NotFound);
/// assert_eq!(status.message(), Some("user not found"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: Option<String>,
    details: Vec<ErrorDetail>,
}

impl Status {
    /// Create a new status with a code and description.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        Self {
            code,
            message: Some(message.into()),
            details: vec![],
        }
    }

    /// Create a new status with just a code.
    pub fn from_code(code: Code) -> Self {
        Self {
            code,
            message: None,
            details: vec![],
        }
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }

    /// Attach pre-constructed details.
    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(Code::Internal, message)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rpc error: code = {}", self.code.as_str())?;
        if let Some(msg) = &self.message {
            write!(f, " desc = {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}
