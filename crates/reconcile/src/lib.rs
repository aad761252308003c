//! # Reconcile
//!
//! Sequential, idempotent state reconciliation for a short, ordered list of
//! resource declarations.
//!
//! This crate provides the core abstractions for declaring desired host
//! state, detecting drift, and converging the host to match, one
//! declaration at a time in authored order. Later declarations may depend
//! on the side effects of earlier ones (an account must exist before a
//! directory can be owned by it), so there is deliberately no parallelism.
//!
//! ## Core Concepts
//!
//! - **Resource**: something with observable state that can be converged
//!   (an account, a directory, a package, a shell fixup)
//! - **Outcome**: what applying one declaration did: `Unchanged`,
//!   `Converged`, `Skipped`, or `Failed`
//! - **Executor**: walks the declarations strictly in order, fail-fast by
//!   default, and records every outcome in an [`ExecutionReport`]
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{
//!     execute, ApplyContext, ApplyOptions, CancelToken, NoProgress,
//!     Outcome, Resource, ResourceState,
//! };
//!
//! #[derive(Debug)]
//! struct MarkerFile { path: String }
//!
//! impl Resource for MarkerFile {
//!     fn id(&self) -> String { format!("file:{}", self.path) }
//!     fn description(&self) -> String { format!("Marker file {}", self.path) }
//!     fn resource_type(&self) -> &'static str { "file" }
//!
//!     fn current_state(&self) -> anyhow::Result<ResourceState> {
//!         if std::path::Path::new(&self.path).exists() {
//!             Ok(ResourceState::Present { details: None })
//!         } else {
//!             Ok(ResourceState::Absent)
//!         }
//!     }
//!
//!     fn desired_state(&self) -> ResourceState {
//!         ResourceState::Present { details: None }
//!     }
//!
//!     fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<Outcome> {
//!         if std::path::Path::new(&self.path).exists() {
//!             return Ok(Outcome::Unchanged);
//!         }
//!         std::fs::write(&self.path, b"")?;
//!         Ok(Outcome::converged())
//!     }
//! }
//!
//! let resources: Vec<Box<dyn Resource>> = vec![Box::new(MarkerFile {
//!     path: "/tmp/provisioned".into(),
//! })];
//!
//! let report = execute(
//!     &resources,
//!     &ApplyOptions::default(),
//!     &CancelToken::new(),
//!     &mut NoProgress,
//! );
//! assert!(report.is_success());
//! ```
//!
//! ## Skip conditions and dependencies
//!
//! A resource may declare a [`Resource::skip_reason`]: when it returns
//! `Some`, the declaration is satisfied by definition and the executor
//! records `Unchanged` without touching any backend. [`Resource::requires`]
//! names prerequisite declarations by id; under continue-on-error a
//! declaration whose prerequisite failed is skipped rather than attempted.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod report;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, CancelToken, NoProgress, ProgressCallback};
pub use diff::{compute_diffs, DiffSummary, ResourceDiff};
pub use error::ReconcileError;
pub use executor::execute;
pub use report::{ExecutionReport, RecordedOutcome};
pub use resource::{BoxedResource, Resource};
pub use types::{ApplyOptions, CommandOutput, Outcome, ResourceState, RunSummary};
