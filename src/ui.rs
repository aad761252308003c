use colored::{ColoredString, Colorize};
use reconcile::{Outcome, ResourceDiff, ResourceState};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Symbol for a reconciliation outcome
pub fn outcome_symbol(outcome: &Outcome) -> ColoredString {
    match outcome {
        Outcome::Unchanged => "○".dimmed(),
        Outcome::Converged { .. } => "✓".green(),
        Outcome::Skipped { .. } => "⊘".yellow(),
        Outcome::Failed { .. } => "✗".red(),
    }
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Planned Changes".bold()
    );
    println!("│");

    let mut current_type = "";
    for diff in diffs {
        if diff.resource_type != current_type {
            println!("│ {}", type_heading(&diff.resource_type).bold());
            current_type = &diff.resource_type;
        }

        let symbol = match (&diff.current, &diff.desired) {
            (ResourceState::Absent, ResourceState::Present { .. }) => "+".green(),
            (ResourceState::Unknown, _) => "?".dimmed(),
            _ => "~".yellow(),
        };

        let state_desc = match &diff.current {
            ResourceState::Absent => "(missing)".to_string(),
            ResourceState::Modified { from, to } => format!("{} → {}", from, to),
            ResourceState::Unknown => "(runs every apply)".to_string(),
            ResourceState::Present { .. } => String::new(),
        };

        println!(
            "│   {} {:<36} {}",
            symbol,
            diff.resource_id,
            state_desc.dimmed()
        );
    }

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!("│ Summary: {} changes", diffs.len().to_string().bold());
    println!("└─────────────────────────────────────────────────────┘");
}

fn type_heading(resource_type: &str) -> &str {
    match resource_type {
        "user_account" => "Accounts",
        "directory" => "Directories",
        "apt_package" => "Packages (apt)",
        "shell_fixup" => "Fixups",
        other => other,
    }
}
