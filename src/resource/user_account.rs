//! OS user account resource
//!
//! Probes through `getent passwd`, converges through `useradd`. The root
//! account is guarded by a skip condition and is never managed.

use anyhow::{Context, Result};
use reconcile::{ApplyContext, Outcome, ReconcileError, Resource, ResourceState};
use std::path::PathBuf;
use std::process::Command;

/// A local account that must exist
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub name: String,
    pub home: PathBuf,
    /// Create the home directory along with the account
    pub manage_home: bool,
    /// Create a same-named group and make it the primary group
    pub create_group: bool,
    /// Never generate SSH keypairs for the account
    pub generate_ssh_key: bool,
}

/// One line of getent passwd output
#[derive(Debug, Clone, PartialEq, Eq)]
struct PasswdEntry {
    name: String,
    uid: u32,
    home: PathBuf,
}

impl UserAccount {
    pub fn new(name: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
            manage_home: true,
            create_group: true,
            generate_ssh_key: false,
        }
    }

    /// Look the account up in the user database
    ///
    /// getent exits 2 when the key is unknown; anything else non-zero is a
    /// real backend problem.
    fn lookup(&self) -> Result<Option<PasswdEntry>> {
        let output = Command::new("getent")
            .args(["passwd", &self.name])
            .output()
            .context("Failed to run getent passwd")?;

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Ok(parse_passwd_line(stdout.trim()))
            }
            Some(2) => Ok(None),
            _ => anyhow::bail!(
                "getent passwd {} failed: {}",
                self.name,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
    }

    /// Arguments for useradd, derived from the declaration
    fn useradd_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.manage_home {
            args.push("-m".to_string());
        }
        if self.create_group {
            args.push("-U".to_string());
        } else {
            args.push("-N".to_string());
        }
        args.push("-d".to_string());
        args.push(self.home.to_string_lossy().to_string());
        args.push(self.name.clone());
        args
    }

    /// Create the account
    fn create(&self) -> Result<()> {
        let output = Command::new("useradd")
            .args(self.useradd_args())
            .output()
            .context("Failed to run useradd")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReconcileError::AccountCreation {
                name: self.name.clone(),
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Parse a `name:x:uid:gid:gecos:home:shell` line
fn parse_passwd_line(line: &str) -> Option<PasswdEntry> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 6 {
        return None;
    }
    Some(PasswdEntry {
        name: fields[0].to_string(),
        uid: fields[2].parse().ok()?,
        home: PathBuf::from(fields[5]),
    })
}

impl Resource for UserAccount {
    fn id(&self) -> String {
        format!("user:{}", self.name)
    }

    fn description(&self) -> String {
        format!("Account {} with home {}", self.name, self.home.display())
    }

    fn resource_type(&self) -> &'static str {
        "user_account"
    }

    fn skip_reason(&self) -> Option<String> {
        (self.name == "root").then(|| "the root account is never managed".to_string())
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.lookup()? {
            None => Ok(ResourceState::Absent),
            Some(entry) if entry.home == self.home => Ok(ResourceState::Present { details: None }),
            Some(entry) => Ok(ResourceState::Modified {
                from: format!("home {}", entry.home.display()),
                to: format!("home {}", self.home.display()),
            }),
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

        match self.lookup()? {
            Some(entry) if entry.home == self.home => Ok(Outcome::Unchanged),
            Some(entry) => Err(ReconcileError::AccountCreation {
                name: self.name.clone(),
                reason: format!(
                    "account exists with home {} (declared {})",
                    entry.home.display(),
                    self.home.display()
                ),
            }
            .into()),
            None => {
                self.create()?;
                Ok(Outcome::Converged {
                    details: Some(format!("created via useradd {}", self.name)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_account_is_skip_guarded() {
        let account = UserAccount::new("root", "/root");
        assert!(account.skip_reason().is_some());

        let account = UserAccount::new("valhalla", "/home/valhalla");
        assert!(account.skip_reason().is_none());
    }

    #[test]
    fn useradd_args_reflect_declaration() {
        let account = UserAccount::new("valhalla", "/home/valhalla");
        assert_eq!(
            account.useradd_args(),
            vec!["-m", "-U", "-d", "/home/valhalla", "valhalla"]
        );

        let bare = UserAccount {
            manage_home: false,
            create_group: false,
            ..UserAccount::new("ci", "/var/lib/ci")
        };
        assert_eq!(bare.useradd_args(), vec!["-N", "-d", "/var/lib/ci", "ci"]);
    }

    #[test]
    fn ssh_keys_are_never_generated() {
        let account = UserAccount::new("valhalla", "/home/valhalla");
        assert!(!account.generate_ssh_key);
        // useradd has no keygen flag to begin with; the declaration field
        // documents the intent
        assert!(!account.useradd_args().iter().any(|a| a.contains("ssh")));
    }

    #[test]
    fn parses_passwd_lines() {
        let entry = parse_passwd_line("valhalla:x:1001:1001::/home/valhalla:/bin/bash").unwrap();
        assert_eq!(entry.name, "valhalla");
        assert_eq!(entry.uid, 1001);
        assert_eq!(entry.home, PathBuf::from("/home/valhalla"));

        assert!(parse_passwd_line("garbage").is_none());
        assert!(parse_passwd_line("a:x:notanum:1::/h:/bin/sh").is_none());
    }

    #[test]
    fn existing_root_lookup_matches_skip_guard() {
        // root always exists in the passwd database; the guard means we
        // never get as far as probing it
        let account = UserAccount::new("root", "/root");
        assert_eq!(account.id(), "user:root");
        assert_eq!(account.resource_type(), "user_account");
    }
}
