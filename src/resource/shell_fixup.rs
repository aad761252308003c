//! Shell fixup resource
//!
//! Runs an opaque script body verbatim through bash. There is no change
//! detection for a script, so a successful run always reports Converged;
//! that makes this the one deliberately non-idempotent declaration kind.

use anyhow::{Context, Result};
use reconcile::{ApplyContext, CommandOutput, Outcome, ReconcileError, Resource, ResourceState};
use std::process::Command;

/// Number of stderr lines kept in a failure report
const STDERR_TAIL_LINES: usize = 5;

/// An imperative script that runs on every apply
#[derive(Debug, Clone)]
pub struct ShellFixup {
    pub name: String,
    pub script: String,
    /// Ids of declarations that must have run first
    prerequisites: Vec<String>,
}

impl ShellFixup {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            prerequisites: Vec::new(),
        }
    }

    /// Declare that `id` must have been processed before this script
    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    /// Run the script body in the reconciler's working directory
    fn run(&self) -> Result<CommandOutput> {
        let output = Command::new("bash")
            .args(["-c", &self.script])
            .output()
            .context("Failed to run bash")?;
        Ok(output.into())
    }
}

impl Resource for ShellFixup {
    fn id(&self) -> String {
        format!("fixup:{}", self.name)
    }

    fn description(&self) -> String {
        format!("Run fixup script '{}'", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "shell_fixup"
    }

    fn requires(&self) -> Vec<String> {
        self.prerequisites.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        // Opaque script: state is unknowable without running it
        Ok(ResourceState::Unknown)
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn needs_apply(&self) -> Result<bool> {
        Ok(true)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<Outcome> {
        if ctx.dry_run {
            return Ok(Outcome::Skipped {
                reason: "dry-run".to_string(),
            });
        }

        let output = self.run()?;

        if !output.success {
            return Err(ReconcileError::ShellExit {
                code: output.code.unwrap_or(-1),
                stderr_tail: output.stderr_tail(STDERR_TAIL_LINES),
            }
            .into());
        }

        let stdout = output.stdout_str();
        let details = (!stdout.trim().is_empty()).then(|| stdout.trim().to_string());
        Ok(Outcome::Converged { details })
    }
}
