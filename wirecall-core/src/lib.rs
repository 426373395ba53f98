//! Core protocol types for wirecall.
//!
//! This crate provides the types shared by anything speaking the wirecall
//! wire format, independent of how calls are scheduled or retried.
//!
//! ## Modules
//!
//! - [`error`]: Status codes and the [`Status`] error type
//! - [`codec`]: Compression codec trait and implementations
//! - [`compression`]: Compression encoding negotiation
//! - [`envelope`]: Length-prefixed message framing

mod codec;
mod compression;
mod envelope;
mod error;

pub use codec::*;
pub use compression::*;
pub use envelope::*;
pub use error::*;
