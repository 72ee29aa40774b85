//! Progress reporting for streaming passes.
//!
//! Passes report how many input bytes they have consumed through the
//! [`ProgressCallback`] trait, keeping the library crates free of any
//! terminal rendering. The CLI plugs in an `indicatif` implementation;
//! library callers and tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a streaming pass.
pub trait ProgressCallback: Send + Sync {
    /// Total size of the input in bytes, when known.
    fn set_total(&self, total: u64);

    /// Bytes consumed so far (absolute, not delta).
    fn set_position(&self, pos: u64);

    /// Replace the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// The pass is complete.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// How many elements a pass processes between position updates.
pub const REPORT_EVERY: u64 = 10_000;
