//! Call options and the configuration they act on.

use std::sync::{Arc, Mutex};

use crate::ClientError;
use crate::metadata::Metadata;

/// Configuration and received metadata for a single invocation.
///
/// Created once per call. Option `before` hooks populate it, each attempt
/// overwrites `header` and `trailer` (the last attempt wins) and option
/// `after` hooks read it once the call is over.
#[derive(Debug, Clone, Default)]
pub struct CallConfig {
    pub(crate) fail_fast: bool,
    pub(crate) header: Metadata,
    pub(crate) trailer: Metadata,
}

impl CallConfig {
    /// A config seeded with the connection's fail-fast default.
    pub fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast,
            ..Default::default()
        }
    }

    /// Whether the call gives up after the first recorded error.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn set_fail_fast(&mut self, fail_fast: bool) {
        self.fail_fast = fail_fast;
    }

    /// Header metadata from the most recent attempt.
    pub fn header(&self) -> &Metadata {
        &self.header
    }

    /// Trailer metadata from the most recent attempt.
    pub fn trailer(&self) -> &Metadata {
        &self.trailer
    }
}

/// A hook pair run around an invocation.
///
/// `before` runs in option order before any network activity; an error aborts
/// the call. `after` runs exactly once for every supplied option when the
/// call ends, whatever the outcome.
///
/// # Example
///
/// ```ignore
/// use wirecall_client::{CallConfig, CallOption, ClientError};
///
/// struct Audit;
///
/// impl CallOption for Audit {
///     fn after(&self, config: &CallConfig) {
///         println!("server said: {:?}", config.trailer().get("x-audit"));
///     }
/// }
/// ```
pub trait CallOption: Send + Sync {
    fn before(&self, config: &mut CallConfig) -> Result<(), ClientError> {
        let _ = config;
        Ok(())
    }

    fn after(&self, config: &CallConfig) {
        let _ = config;
    }
}

/// Overrides the fail-fast flag for one call.
///
/// With fail-fast set, the first connection failure ends the call instead of
/// moving on to another transport.
#[derive(Debug, Clone, Copy)]
pub struct FailFast(pub bool);

impl CallOption for FailFast {
    fn before(&self, config: &mut CallConfig) -> Result<(), ClientError> {
        config.fail_fast = self.0;
        Ok(())
    }
}

/// Shared storage an option copies received metadata into.
#[derive(Debug, Clone, Default)]
pub struct MetadataSlot(Arc<Mutex<Metadata>>);

impl MetadataSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored metadata.
    pub fn get(&self) -> Metadata {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn store(&self, metadata: Metadata) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = metadata;
    }
}

/// Copies the call's header metadata into a [`MetadataSlot`] when the call
/// ends.
#[derive(Debug, Clone)]
pub struct CaptureHeader(MetadataSlot);

impl CaptureHeader {
    pub fn new(slot: &MetadataSlot) -> Self {
        Self(slot.clone())
    }
}

impl CallOption for CaptureHeader {
    fn after(&self, config: &CallConfig) {
        self.0.store(config.header.clone());
    }
}

/// Copies the call's trailer metadata into a [`MetadataSlot`] when the call
/// ends.
#[derive(Debug, Clone)]
pub struct CaptureTrailer(MetadataSlot);

impl CaptureTrailer {
    pub fn new(slot: &MetadataSlot) -> Self {
        Self(slot.clone())
    }
}

impl CallOption for CaptureTrailer {
    fn after(&self, config: &CallConfig) {
        self.0.store(config.trailer.clone());
    }
}

/// A call option built from two closures.
///
/// ```ignore
/// use wirecall_client::FnOption;
///
/// let log = FnOption::new(
///     |config| {
///         config.set_fail_fast(true);
///         Ok(())
///     },
///     |config| println!("trailer: {:?}", config.trailer()),
/// );
/// ```
pub struct FnOption<B, A> {
    before: B,
    after: A,
}

impl<B, A> FnOption<B, A>
where
    B: Fn(&mut CallConfig) -> Result<(), ClientError> + Send + Sync,
    A: Fn(&CallConfig) + Send + Sync,
{
    pub fn new(before: B, after: A) -> Self {
        Self { before, after }
    }
}

impl<B, A> CallOption for FnOption<B, A>
where
    B: Fn(&mut CallConfig) -> Result<(), ClientError> + Send + Sync,
    A: Fn(&CallConfig) + Send + Sync,
{
    fn before(&self, config: &mut CallConfig) -> Result<(), ClientError> {
        (self.before)(config)
    }

    fn after(&self, config: &CallConfig) {
        (self.after)(config)
    }
}
