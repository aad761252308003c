//! APT package resource
//!
//! Presence probe through `dpkg-query`, convergence through
//! `apt-get install`. Installing from unauthenticated repositories is a
//! trust relaxation and is only done when explicitly declared.

use anyhow::{Context, Result};
use reconcile::{ApplyContext, Outcome, ReconcileError, Resource, ResourceState};
use std::process::Command;

/// An APT package that must be installed
#[derive(Debug, Clone)]
pub struct AptPackage {
    pub name: String,
    /// Accept packages from unauthenticated sources (apt --allow-unauthenticated)
    pub allow_unauthenticated: bool,
}

impl AptPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_unauthenticated: false,
        }
    }

    pub fn with_allow_unauthenticated(mut self, allow: bool) -> Self {
        self.allow_unauthenticated = allow;
        self
    }

    /// Check if the package is installed
    fn is_installed(&self) -> Result<bool> {
        let output = Command::new("dpkg-query")
            .args(["-W", "-f=${Status}", &self.name])
            .output()
            .context("Failed to run dpkg-query")?;

        // dpkg-query exits non-zero for packages it has never heard of
        if !output.status.success() {
            return Ok(false);
        }

        Ok(dpkg_status_is_installed(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    /// Arguments for apt-get, derived from the declaration
    fn install_args(&self) -> Vec<&str> {
        let mut args = vec!["install", "-y"];
        if self.allow_unauthenticated {
            args.push("--allow-unauthenticated");
        }
        args.push(&self.name);
        args
    }

    /// Install the package
    fn install(&self) -> Result<()> {
        if self.allow_unauthenticated {
            log::warn!(
                "installing {} with unauthenticated sources allowed",
                self.name
            );
        }

        let output = Command::new("apt-get")
            .env("DEBIAN_FRONTEND", "noninteractive")
            .args(self.install_args())
            .output()
            .context("Failed to run apt-get")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_install_failure(&self.name, stderr.trim()).into());
        }

        Ok(())
    }
}

/// dpkg `${Status}` is "want flag status"; installed iff status is
/// "installed" with an ok flag (covers "install ok installed" and
/// "hold ok installed")
fn dpkg_status_is_installed(status: &str) -> bool {
    status.trim().ends_with("ok installed")
}

/// Split "unknown package" from transport/repository failures
fn classify_install_failure(name: &str, stderr: &str) -> ReconcileError {
    if stderr.contains("Unable to locate package") || stderr.contains("no installation candidate") {
        ReconcileError::UnresolvablePackage {
            name: name.to_string(),
        }
    } else {
        ReconcileError::PackageBackend {
            name: name.to_string(),
            reason: stderr.to_string(),
        }
    }
}

impl Resource for AptPackage {
    fn id(&self) -> String {
        format!("pkg:{}", self.name)
    }

    fn description(&self) -> String {
        format!("Install package {} via apt", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "apt_package"
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.is_installed()? {
            Ok(ResourceState::Present { details: None })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<Outcome> {
        if ctx.dry_run {
            return Ok(Outcome::Skipped {
                reason: "dry-run".to_string(),
            });
        }

        if self.is_installed()? {
            return Ok(Outcome::Unchanged);
        }

        self.install()?;
        Ok(Outcome::Converged { details: None })
    }
}
