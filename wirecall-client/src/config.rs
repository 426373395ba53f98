//! Per-call configuration.
//!
//! - [`CallConfig`]: State owned by one invocation (fail-fast flag, last
//!   received header and trailer metadata)
//! - [`CallOption`]: Hooks that populate the config before dispatch and
//!   observe it when the call ends

mod hooks;
mod options;

pub(crate) use hooks::OptionGuard;
pub use options::{
    CallConfig, CallOption, CaptureHeader, CaptureTrailer, FailFast, FnOption, MetadataSlot,
};
