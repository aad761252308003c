//! Execution report - the ordered record of a reconciliation run

use crate::types::{Outcome, RunSummary};
use serde::{Deserialize, Serialize};

/// Outcome of one declaration, in application order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedOutcome {
    /// Position of the declaration in the plan
    pub index: usize,
    /// Resource id (e.g. "pkg:gcc-4.8")
    pub resource_id: String,
    /// Resource type (e.g. "apt_package")
    pub resource_type: String,
    /// What applying the declaration did
    pub outcome: Outcome,
}

/// Accumulated outcomes of a run
///
/// A pure sink: the executor records into it in application order, the
/// caller reads the ordered log and the summary afterwards. Declarations
/// that were never attempted (fail-fast halt, cancellation) have no entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    entries: Vec<RecordedOutcome>,
    /// True when the run stopped on a cancellation signal
    pub interrupted: bool,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one declaration
    pub fn record(
        &mut self,
        index: usize,
        resource_id: String,
        resource_type: &str,
        outcome: Outcome,
    ) {
        self.entries.push(RecordedOutcome {
            index,
            resource_id,
            resource_type: resource_type.to_string(),
            outcome,
        });
    }

    /// Ordered log of everything that was processed
    pub fn entries(&self) -> &[RecordedOutcome] {
        &self.entries
    }

    /// Counts by outcome kind
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.entries {
            summary.add_outcome(&entry.outcome);
        }
        summary
    }

    /// The first failed entry, if any
    pub fn first_failure(&self) -> Option<&RecordedOutcome> {
        self.entries
            .iter()
            .find(|e| matches!(e.outcome, Outcome::Failed { .. }))
    }

    /// Check if the run completed without failures or cancellation
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.summary().is_success()
    }
}
