//! Apply context, progress callbacks, and cancellation
//!
//! The callback traits keep this crate free of any terminal or UI
//! dependency; the binary wires in its own rendering.

use crate::types::Outcome;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Context passed to resource apply operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
}

impl ApplyContext {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}

/// Cooperative cancellation flag
///
/// Observed by the executor between declarations only: a declaration
/// already in progress always runs to completion, so the host is never
/// left with a half-created account or a package transaction mid-flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop before the next declaration
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress callback for reconciliation runs
///
/// Implement this trait to receive per-declaration updates during execution.
pub trait ProgressCallback {
    /// Called once before the first declaration
    fn on_run_start(&mut self, total: usize);

    /// Called when a declaration is about to be processed
    fn on_resource_start(&mut self, id: &str, description: &str);

    /// Called when a declaration produced an outcome
    fn on_resource_complete(&mut self, id: &str, outcome: &Outcome);

    /// Called once after the last processed declaration
    fn on_run_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_run_start(&mut self, _total: usize) {}
    fn on_resource_start(&mut self, _id: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _id: &str, _outcome: &Outcome) {}
    fn on_run_complete(&mut self) {}
}
