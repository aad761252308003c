//! Reconciliation commands
//!
//! - `status` - current vs declared state per declaration
//! - `diff` - preview what apply would change
//! - `apply` - converge the host, strictly in plan order

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs};
use crate::config::NodeConfig;
use crate::recipe::{self, PlanOptions};
use crate::ui;
use reconcile::{
    ApplyOptions, CancelToken, DiffSummary, Outcome, ProgressCallback, Resource, compute_diffs,
    execute,
};

/// Show per-declaration state
pub fn status(ctx: &Context, args: &PlanArgs) -> Result<bool> {
    ui::header("Groundwork Status");

    let config = NodeConfig::load(args.config.as_deref())?;
    let plan = recipe::build_plan(&config, &PlanOptions::default())?;

    let diffs = compute_diffs(&plan);
    let drifted: Vec<&str> = diffs.iter().map(|d| d.resource_id.as_str()).collect();

    ui::section("Declarations");
    for resource in &plan {
        let id = resource.id();
        if resource.skip_reason().is_some() {
            println!("  {} {} {}", "○".dimmed(), id, "(guarded)".dimmed());
        } else if drifted.contains(&id.as_str()) {
            println!("  {} {}", "✗".red(), id);
            if !ctx.quiet {
                ui::dim(&format!("    {}", resource.description()));
            }
        } else {
            println!("  {} {}", "✓".green(), id);
        }
    }

    let summary = DiffSummary::from_diffs(&diffs);
    println!();
    if summary.has_changes() {
        ui::warn(&format!(
            "{} of {} declarations differ from declared state",
            summary.total(),
            plan.len()
        ));
    } else {
        ui::success("Host matches the declared state");
    }

    Ok(true)
}

/// Preview without mutating
pub fn diff(_ctx: &Context, args: &PlanArgs) -> Result<bool> {
    ui::header("Planned Changes");

    let config = NodeConfig::load(args.config.as_deref())?;
    let plan = recipe::build_plan(&config, &PlanOptions::default())?;

    ui::display_diff(&compute_diffs(&plan));
    Ok(true)
}

/// Converge the host
pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<bool> {
    ui::header("Applying Baseline");

    if args.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let config = NodeConfig::load(args.plan.config.as_deref())?;
    let plan_opts = PlanOptions {
        allow_unauthenticated: args.allow_unauthenticated,
    };
    let plan = recipe::build_plan(&config, &plan_opts)?;

    if !args.dry_run && !running_as_root() {
        ui::warn("Not running as root; account, directory and package steps will likely fail");
    }

    // Preview before touching anything
    ui::display_diff(&compute_diffs(&plan));

    if !args.dry_run && !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(true);
    }

    let opts = ApplyOptions {
        dry_run: args.dry_run,
        continue_on_error: args.continue_on_error,
        verbose: ctx.verbose > 0,
    };

    let mut progress = CliProgress { quiet: ctx.quiet };
    let report = execute(&plan, &opts, &CancelToken::new(), &mut progress);

    print_summary(&report, plan.len());
    Ok(report.is_success())
}

/// Per-declaration terminal output during a run
struct CliProgress {
    quiet: bool,
}

impl ProgressCallback for CliProgress {
    fn on_run_start(&mut self, total: usize) {
        ui::section(&format!("Reconciling {} declarations", total));
    }

    fn on_resource_start(&mut self, _id: &str, _description: &str) {}

    fn on_resource_complete(&mut self, id: &str, outcome: &Outcome) {
        println!("  {} {}", ui::outcome_symbol(outcome), id);

        if self.quiet {
            return;
        }
        match outcome {
            Outcome::Failed { error } => ui::dim(&format!("    {}", error)),
            Outcome::Skipped { reason } => ui::dim(&format!("    {}", reason)),
            Outcome::Converged {
                details: Some(details),
            } => ui::dim(&format!("    {}", details)),
            _ => {}
        }
    }

    fn on_run_complete(&mut self) {}
}

/// Final run summary
fn print_summary(report: &reconcile::ExecutionReport, planned: usize) {
    let summary = report.summary();

    println!();
    if report.is_success() {
        ui::success("Baseline applied");
    } else if report.interrupted {
        ui::warn("Run cancelled before completion");
    } else {
        ui::error("Baseline applied with errors");
    }

    ui::kv("converged", &summary.converged.to_string());
    ui::kv("unchanged", &summary.unchanged.to_string());
    if summary.skipped > 0 {
        ui::kv("skipped", &summary.skipped.to_string());
    }
    if summary.failed > 0 {
        ui::kv("failed", &summary.failed.to_string());
    }
    if summary.total() < planned {
        ui::kv(
            "not attempted",
            &(planned - summary.total()).to_string(),
        );
    }

    if let Some(failure) = report.first_failure() {
        if let Outcome::Failed { error } = &failure.outcome {
            println!();
            ui::error(&format!(
                "declaration #{} ({}) failed: {}",
                failure.index + 1,
                failure.resource_id,
                error
            ));
        }
    }
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}
