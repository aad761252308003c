//! Execution engine - applies declarations strictly in authored order
//!
//! There is no parallelism here on purpose: each declaration may depend on
//! side effects of the previous one (the account must exist before the
//! directory can be owned by it, packages must be present before a fixup
//! references them). The engine has no retries and no rollback; a
//! declaration transitions Pending -> Unchanged | Converged | Skipped |
//! Failed exactly once.

use crate::context::{ApplyContext, CancelToken, ProgressCallback};
use crate::report::ExecutionReport;
use crate::resource::{BoxedResource, Resource};
use crate::types::{ApplyOptions, Outcome};
use std::collections::HashSet;

/// Execute an ordered plan and record every outcome
///
/// Policy:
/// - Fail-fast by default: the first `Failed` outcome is recorded and the
///   remaining declarations are never attempted.
/// - With `continue_on_error`, processing continues, but a declaration
///   whose prerequisite (see [`Resource::requires`]) failed upstream is
///   recorded as `Skipped` instead of attempted.
/// - Cancellation is honored between declarations, never mid-declaration.
/// - Dry run probes current state but applies nothing.
pub fn execute<P: ProgressCallback>(
    resources: &[BoxedResource],
    opts: &ApplyOptions,
    cancel: &CancelToken,
    progress: &mut P,
) -> ExecutionReport {
    let mut report = ExecutionReport::new();
    let mut failed_ids: HashSet<String> = HashSet::new();

    progress.on_run_start(resources.len());

    for (index, resource) in resources.iter().enumerate() {
        if cancel.is_cancelled() {
            report.interrupted = true;
            break;
        }

        let id = resource.id();
        progress.on_resource_start(&id, &resource.description());

        let outcome = process_resource(resource.as_ref(), opts, &failed_ids);

        let failed = !outcome.is_success();
        progress.on_resource_complete(&id, &outcome);
        report.record(index, id.clone(), resource.resource_type(), outcome);

        if failed {
            failed_ids.insert(id);
            if !opts.continue_on_error {
                break;
            }
        }
    }

    progress.on_run_complete();
    report
}

/// Drive a single declaration to its outcome
fn process_resource(
    resource: &dyn Resource,
    opts: &ApplyOptions,
    failed_ids: &HashSet<String>,
) -> Outcome {
    // Skip condition: satisfied by definition, zero backend calls
    if resource.skip_reason().is_some() {
        return Outcome::Unchanged;
    }

    // A failed prerequisite means this declaration cannot meaningfully run
    if let Some(dep) = resource
        .requires()
        .into_iter()
        .find(|dep| failed_ids.contains(dep))
    {
        return Outcome::Skipped {
            reason: format!("prerequisite {dep} failed"),
        };
    }

    if opts.dry_run {
        return match resource.needs_apply() {
            Ok(true) => Outcome::Skipped {
                reason: "dry-run".to_string(),
            },
            Ok(false) => Outcome::Unchanged,
            Err(e) => Outcome::Failed {
                error: format!("state probe failed: {e:#}"),
            },
        };
    }

    let mut ctx = ApplyContext::new(false, opts.verbose);
    match resource.apply(&mut ctx) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Failed {
            error: format!("{e:#}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::types::ResourceState;
    use anyhow::Result;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Mock declaration with observable backend traffic
    #[derive(Debug)]
    struct TestResource {
        id: String,
        requires: Vec<String>,
        skip: Option<String>,
        fail: bool,
        converged: Arc<AtomicBool>,
        backend_calls: Arc<AtomicUsize>,
        cancel_after: Option<CancelToken>,
    }

    impl TestResource {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                requires: Vec::new(),
                skip: None,
                fail: false,
                converged: Arc::new(AtomicBool::new(false)),
                backend_calls: Arc::new(AtomicUsize::new(0)),
                cancel_after: None,
            }
        }

        fn failing(id: &str) -> Self {
            Self {
                fail: true,
                ..Self::new(id)
            }
        }
    }

    impl Resource for TestResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn description(&self) -> String {
            format!("Test resource {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn skip_reason(&self) -> Option<String> {
            self.skip.clone()
        }

        fn requires(&self) -> Vec<String> {
            self.requires.clone()
        }

        fn current_state(&self) -> Result<ResourceState> {
            self.backend_calls.fetch_add(1, Ordering::SeqCst);
            if self.converged.load(Ordering::SeqCst) {
                Ok(ResourceState::Present { details: None })
            } else {
                Ok(ResourceState::Absent)
            }
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Present { details: None }
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<Outcome> {
            self.backend_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(token) = &self.cancel_after {
                token.cancel();
            }

            if self.fail {
                anyhow::bail!("backend refused {}", self.id);
            }

            if self.converged.swap(true, Ordering::SeqCst) {
                Ok(Outcome::Unchanged)
            } else {
                Ok(Outcome::converged())
            }
        }
    }

    fn run(resources: &[BoxedResource], opts: &ApplyOptions) -> ExecutionReport {
        execute(resources, opts, &CancelToken::new(), &mut NoProgress)
    }

    #[test]
    fn empty_plan_succeeds() {
        let report = run(&[], &ApplyOptions::default());
        assert!(report.is_success());
        assert_eq!(report.entries().len(), 0);
    }

    #[test]
    fn second_run_is_unchanged_everywhere() {
        let a = TestResource::new("a");
        let b = TestResource::new("b");
        let (a_state, b_state) = (Arc::clone(&a.converged), Arc::clone(&b.converged));
        let resources: Vec<BoxedResource> = vec![Box::new(a), Box::new(b)];

        let first = run(&resources, &ApplyOptions::default());
        assert_eq!(first.summary().converged, 2);
        assert!(a_state.load(Ordering::SeqCst) && b_state.load(Ordering::SeqCst));

        let second = run(&resources, &ApplyOptions::default());
        assert_eq!(second.summary().unchanged, 2);
        assert_eq!(second.summary().converged, 0);
    }

    #[test]
    fn skip_condition_yields_unchanged_with_zero_backend_calls() {
        let mut guarded = TestResource::new("user:root");
        guarded.skip = Some("managing root is not allowed".to_string());
        let calls = Arc::clone(&guarded.backend_calls);
        let resources: Vec<BoxedResource> = vec![Box::new(guarded)];

        let report = run(&resources, &ApplyOptions::default());
        assert_eq!(report.entries()[0].outcome, Outcome::Unchanged);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fail_fast_halts_after_first_failure() {
        let resources: Vec<BoxedResource> = vec![
            Box::new(TestResource::new("a")),
            Box::new(TestResource::new("b")),
            Box::new(TestResource::failing("c")),
            Box::new(TestResource::new("d")),
            Box::new(TestResource::new("e")),
        ];

        let report = run(&resources, &ApplyOptions::default());
        assert_eq!(report.entries().len(), 3);
        assert!(matches!(
            report.entries()[2].outcome,
            Outcome::Failed { .. }
        ));
        assert!(!report.is_success());
    }

    #[test]
    fn continue_on_error_processes_independent_declarations() {
        let mut dependent = TestResource::new("d");
        dependent.requires = vec!["c".to_string()];

        let resources: Vec<BoxedResource> = vec![
            Box::new(TestResource::new("a")),
            Box::new(TestResource::failing("c")),
            Box::new(dependent),
            Box::new(TestResource::new("e")),
        ];

        let opts = ApplyOptions {
            continue_on_error: true,
            ..Default::default()
        };
        let report = run(&resources, &opts);

        assert_eq!(report.entries().len(), 4);
        assert!(matches!(
            report.entries()[1].outcome,
            Outcome::Failed { .. }
        ));
        assert_eq!(
            report.entries()[2].outcome,
            Outcome::Skipped {
                reason: "prerequisite c failed".to_string()
            }
        );
        assert!(report.entries()[3].outcome.is_change());
    }

    #[test]
    fn satisfied_prerequisites_do_not_skip() {
        let mut dependent = TestResource::new("b");
        dependent.requires = vec!["a".to_string()];

        let resources: Vec<BoxedResource> =
            vec![Box::new(TestResource::new("a")), Box::new(dependent)];

        let opts = ApplyOptions {
            continue_on_error: true,
            ..Default::default()
        };
        let report = run(&resources, &opts);
        assert_eq!(report.summary().converged, 2);
    }

    #[test]
    fn dry_run_probes_but_never_applies() {
        let pending = TestResource::new("a");
        let satisfied = TestResource::new("b");
        satisfied.converged.store(true, Ordering::SeqCst);
        let state = Arc::clone(&pending.converged);

        let resources: Vec<BoxedResource> = vec![Box::new(pending), Box::new(satisfied)];
        let opts = ApplyOptions {
            dry_run: true,
            ..Default::default()
        };

        let report = run(&resources, &opts);
        assert_eq!(
            report.entries()[0].outcome,
            Outcome::Skipped {
                reason: "dry-run".to_string()
            }
        );
        assert_eq!(report.entries()[1].outcome, Outcome::Unchanged);
        // Nothing was mutated
        assert!(!state.load(Ordering::SeqCst));
    }

    #[test]
    fn cancellation_stops_before_next_declaration() {
        let token = CancelToken::new();
        let mut first = TestResource::new("a");
        first.cancel_after = Some(token.clone());

        let resources: Vec<BoxedResource> =
            vec![Box::new(first), Box::new(TestResource::new("b"))];

        let report = execute(
            &resources,
            &ApplyOptions::default(),
            &token,
            &mut NoProgress,
        );

        // The in-flight declaration ran to completion, the next never started
        assert_eq!(report.entries().len(), 1);
        assert!(report.entries()[0].outcome.is_change());
        assert!(report.interrupted);
        assert!(!report.is_success());
    }

    #[test]
    fn progress_callback_sees_every_processed_declaration() {
        struct CountingProgress {
            started: usize,
            completed: usize,
        }

        impl ProgressCallback for CountingProgress {
            fn on_run_start(&mut self, _total: usize) {}
            fn on_resource_start(&mut self, _id: &str, _description: &str) {
                self.started += 1;
            }
            fn on_resource_complete(&mut self, _id: &str, _outcome: &Outcome) {
                self.completed += 1;
            }
            fn on_run_complete(&mut self) {}
        }

        let resources: Vec<BoxedResource> = vec![
            Box::new(TestResource::new("a")),
            Box::new(TestResource::failing("b")),
            Box::new(TestResource::new("c")),
        ];

        let mut progress = CountingProgress {
            started: 0,
            completed: 0,
        };
        execute(
            &resources,
            &ApplyOptions::default(),
            &CancelToken::new(),
            &mut progress,
        );

        assert_eq!(progress.started, 2);
        assert_eq!(progress.completed, 2);
    }
}
