//! Compression encoding negotiation.
//!
//! Requests on the unary path are always sent with
//! [`CompressionEncoding::Identity`]; responses may announce another encoding
//! through the `grpc-encoding` header.

use crate::codec::BoxedCodec;

#[cfg(feature = "gzip")]
use crate::codec::GzipCodec;

/// Metadata key a peer uses to announce its message encoding.
pub const ENCODING_HEADER: &str = "grpc-encoding";

/// Supported message encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionEncoding {
    #[default]
    Identity,
    #[cfg(feature = "gzip")]
    Gzip,
}

impl CompressionEncoding {
    /// Parse an encoding header value. Returns `None` for unsupported
    /// encodings.
    pub fn from_header(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("identity") | Some("") => Some(Self::Identity),
            #[cfg(feature = "gzip")]
            Some("gzip") => Some(Self::Gzip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            #[cfg(feature = "gzip")]
            Self::Gzip => "gzip",
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Codec for this encoding; `None` for identity.
    pub fn codec(&self) -> Option<BoxedCodec> {
        match self {
            Self::Identity => None,
            #[cfg(feature = "gzip")]
            Self::Gzip => Some(BoxedCodec::new(GzipCodec::default())),
        }
    }
}
