//! Resource trait for declarative state management
//!
//! A Resource describes desired state for one thing on the host and knows
//! how to detect its current state and converge it.

use crate::context::ApplyContext;
use crate::types::{Outcome, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every declaration in a plan implements this trait, which provides:
/// - Identity (id, description, type)
/// - State detection (current vs desired)
/// - State convergence (apply)
/// - Skip conditions and ordering prerequisites
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// Stable within a plan. Examples:
    /// - "user:builder" for an account
    /// - "dir:/srv/checkouts" for a directory
    /// - "pkg:gcc-4.8" for a package
    fn id(&self) -> String;

    /// Human-readable description of what this resource ensures
    fn description(&self) -> String;

    /// Resource type category
    ///
    /// Used for grouping and reporting. Examples:
    /// - "user_account", "directory", "apt_package", "shell_fixup"
    fn resource_type(&self) -> &'static str;

    /// Check whether the declaration is satisfied by definition
    ///
    /// When this returns `Some`, the executor records `Unchanged` without
    /// issuing a single backend call. This is the guard for declarations
    /// that must never be managed, such as the root account.
    fn skip_reason(&self) -> Option<String> {
        None
    }

    /// Ids of declarations that must have been processed successfully
    /// before this one may run
    ///
    /// Only consulted under continue-on-error: when a prerequisite failed,
    /// this declaration is skipped instead of attempted. Under the default
    /// fail-fast policy the run has already halted by then.
    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    /// Detect the current state of this resource
    ///
    /// Read-only probe of the system; must not mutate anything.
    fn current_state(&self) -> Result<ResourceState>;

    /// Get the desired state for this resource
    fn desired_state(&self) -> ResourceState;

    /// Check if the resource needs changes to reach desired state
    ///
    /// Default implementation compares current and desired states.
    /// Inherently non-idempotent resources (an opaque script) override this
    /// to always return true.
    fn needs_apply(&self) -> Result<bool> {
        let current = self.current_state()?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Apply changes to reach the desired state
    ///
    /// Must be idempotent where the backend allows it: re-applying an
    /// already-converged declaration returns `Outcome::Unchanged`.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<Outcome>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
