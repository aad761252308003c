//! Diff computation for resources
//!
//! Read-only preview of what a run would change; backs the `status` and
//! `diff` commands and dry-run reporting.

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Position of the declaration in the plan
    pub index: usize,
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    ///
    /// Skip-guarded declarations never diff: they are satisfied by
    /// definition and must produce no backend probe.
    pub fn from_resource(index: usize, resource: &dyn Resource) -> Result<Option<Self>> {
        if resource.skip_reason().is_some() {
            return Ok(None);
        }

        let current = resource.current_state()?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            index,
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
        }))
    }

    /// Check if this diff represents something to be created
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents drift from the declared state
    pub fn is_modification(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Modified { .. }, _) | (_, ResourceState::Modified { .. })
        )
    }
}

/// Compute diffs for an ordered list of resources
///
/// Returns only resources that differ from their desired state, preserving
/// plan order. Probe failures are folded into an `Unknown` current state so
/// a broken backend still shows up in the preview.
pub fn compute_diffs(resources: &[Box<dyn Resource>]) -> Vec<ResourceDiff> {
    resources
        .iter()
        .enumerate()
        .filter_map(|(index, r)| {
            ResourceDiff::from_resource(index, r.as_ref()).unwrap_or_else(|_| {
                Some(ResourceDiff {
                    index,
                    resource_id: r.id(),
                    resource_type: r.resource_type().to_string(),
                    description: r.description(),
                    current: ResourceState::Unknown,
                    desired: r.desired_state(),
                })
            })
        })
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources that drifted
    pub modifications: usize,
    /// Number of resources whose state could not be probed
    pub unknown: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if matches!(diff.current, ResourceState::Unknown) {
                summary.unknown += 1;
            } else if diff.is_addition() {
                summary.additions += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.unknown
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
