use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(version)]
#[command(about = "Bring a build host to its declared baseline", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge the host to the declared state
    Apply(ApplyArgs),

    /// Preview what apply would change
    Diff(PlanArgs),

    /// Show current vs declared state per declaration
    Status(PlanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Path to the host config (TOML)
    #[arg(short, long, env = "GROUNDWORK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Don't make changes, just show what would happen
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep processing declarations with intact prerequisites after a failure
    #[arg(long)]
    pub continue_on_error: bool,

    /// Accept packages from unauthenticated repositories
    #[arg(long)]
    pub allow_unauthenticated: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
