//! Guaranteed `after` hooks.

use super::options::{CallConfig, CallOption};
use crate::ClientError;

/// Owns the [`CallConfig`] of one invocation and runs every option's `after`
/// hook, in option order, when dropped.
///
/// The guard is created before any `before` hook runs, so `after` hooks fire
/// on every exit path: success, a failed `before` hook, an early return from
/// the retry loop or a panic unwinding through the call.
pub(crate) struct OptionGuard<'a> {
    options: &'a [&'a dyn CallOption],
    config: CallConfig,
}

impl<'a> OptionGuard<'a> {
    pub(crate) fn new(options: &'a [&'a dyn CallOption], config: CallConfig) -> Self {
        Self { options, config }
    }

    /// Run `before` hooks in order, stopping at the first error.
    pub(crate) fn run_before(&mut self) -> Result<(), ClientError> {
        for option in self.options {
            option.before(&mut self.config)?;
        }
        Ok(())
    }

    pub(crate) fn config(&self) -> &CallConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut CallConfig {
        &mut self.config
    }
}

impl Drop for OptionGuard<'_> {
    fn drop(&mut self) {
        for option in self.options {
            option.after(&self.config);
        }
    }
}
