//! Core types for sequential state reconciliation

use serde::{Deserialize, Serialize};
use std::process::Output;

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
    /// State cannot be determined
    Unknown,
}

impl ResourceState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Outcome of applying a single declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// State already satisfied intent; nothing was done
    Unchanged,
    /// System state was mutated to reach intent
    Converged { details: Option<String> },
    /// Declaration was not attempted (dry run, failed prerequisite)
    Skipped { reason: String },
    /// Apply failed
    Failed { error: String },
}

impl Outcome {
    /// A converged outcome without captured details
    pub fn converged() -> Self {
        Self::Converged { details: None }
    }

    /// Check if the outcome represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the outcome represents a system-state change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Summary of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub unchanged: usize,
    pub converged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Check if the run was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of declarations that produced an outcome
    pub fn total(&self) -> usize {
        self.unchanged + self.converged + self.skipped + self.failed
    }

    /// Add an outcome to the summary
    pub fn add_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Converged { .. } => self.converged += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &RunSummary) {
        self.unchanged += other.unchanged;
        self.converged += other.converged;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Keep processing declarations with intact prerequisites after a failure
    pub continue_on_error: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Captured output from a backend process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub code: Option<i32>,
    pub success: bool,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Last few lines of stderr, for compact failure reports
    pub fn stderr_tail(&self, lines: usize) -> String {
        let stderr = self.stderr_str();
        let all: Vec<&str> = stderr.trim_end().lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}
