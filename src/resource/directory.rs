//! Directory resource
//!
//! Ensures a path exists as a directory with the declared mode and owner.
//! The owner account must already exist when this declaration runs, which
//! is why the plan orders it after the account declaration.

use anyhow::{Context, Result};
use reconcile::{ApplyContext, Outcome, ReconcileError, Resource, ResourceState};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A directory that must exist with fixed mode and owner
#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
    /// Create missing parent directories
    pub recursive: bool,
    /// Permission bits (e.g. 0o755)
    pub mode: u32,
    /// Owning account name; resolved against the user database at apply time
    pub owner: String,
    /// Ids of declarations that must have run first (the owner's account)
    prerequisites: Vec<String>,
}

#[derive(Debug)]
enum DirState {
    Missing,
    Collision,
    Directory { mode: u32, uid: u32 },
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>, owner: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            mode: 0o755,
            owner: owner.into(),
            prerequisites: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Declare that `id` must have been processed before this directory
    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    fn check_current(&self) -> Result<DirState> {
        let meta = match fs::symlink_metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DirState::Missing),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to stat {}", self.path.display()));
            }
        };

        if !meta.is_dir() {
            return Ok(DirState::Collision);
        }

        Ok(DirState::Directory {
            mode: meta.permissions().mode() & 0o7777,
            uid: meta.uid(),
        })
    }

    /// Resolve the owning account to uid/gid through the user database
    fn resolve_owner(&self) -> Result<(u32, u32)> {
        let output = Command::new("getent")
            .args(["passwd", &self.owner])
            .output()
            .context("Failed to run getent passwd")?;

        if !output.status.success() {
            return Err(ReconcileError::OwnerUnresolved {
                path: self.path.to_string_lossy().to_string(),
                owner: self.owner.clone(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_owner_ids(stdout.trim()).ok_or_else(|| {
            ReconcileError::OwnerUnresolved {
                path: self.path.to_string_lossy().to_string(),
                owner: self.owner.clone(),
            }
            .into()
        })
    }

    fn create(&self) -> Result<()> {
        if self.recursive {
            fs::create_dir_all(&self.path)
        } else {
            fs::create_dir(&self.path)
        }
        .with_context(|| format!("Failed to create {}", self.path.display()))
    }
}

/// Extract (uid, gid) from a passwd line
fn parse_owner_ids(line: &str) -> Option<(u32, u32)> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 4 {
        return None;
    }
    Some((fields[2].parse().ok()?, fields[3].parse().ok()?))
}

impl Resource for Directory {
    fn id(&self) -> String {
        format!("dir:{}", self.path.display())
    }

    fn description(&self) -> String {
        format!(
            "Directory {} mode {:o} owned by {}",
            self.path.display(),
            self.mode,
            self.owner
        )
    }

    fn resource_type(&self) -> &'static str {
        "directory"
    }

    fn requires(&self) -> Vec<String> {
        self.prerequisites.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.check_current()? {
            DirState::Missing => Ok(ResourceState::Absent),
            DirState::Collision => Ok(ResourceState::Modified {
                from: "non-directory".to_string(),
                to: "directory".to_string(),
            }),
            DirState::Directory { mode, uid } => {
                // Owner comparison needs the account to resolve; an
                // unresolvable owner shows up as drift, not a probe error
                let declared = self.resolve_owner().ok();
                match declared {
                    Some((want_uid, _)) if mode == self.mode && uid == want_uid => {
                        Ok(ResourceState::Present { details: None })
                    }
                    _ => Ok(ResourceState::Modified {
                        from: format!("mode {:o}, uid {}", mode, uid),
                        to: format!("mode {:o}, owner {}", self.mode, self.owner),
                    }),
                }
            }
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

        // The owner has to resolve before anything is touched; a missing
        // account means the plan was mis-ordered or the account step failed
        let (uid, gid) = self.resolve_owner()?;

        let mut changed = false;

        match self.check_current()? {
            DirState::Collision => {
                return Err(ReconcileError::PathCollision {
                    path: self.path.to_string_lossy().to_string(),
                }
                .into());
            }
            DirState::Missing => {
                self.create()?;
                changed = true;
            }
            DirState::Directory { .. } => {}
        }

        let meta = fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat {}", self.path.display()))?;

        if meta.permissions().mode() & 0o7777 != self.mode {
            fs::set_permissions(&self.path, fs::Permissions::from_mode(self.mode))
                .with_context(|| format!("Failed to chmod {}", self.path.display()))?;
            changed = true;
        }

        if meta.uid() != uid {
            chown(&self.path, uid, gid)?;
            changed = true;
        }

        if changed {
            Ok(Outcome::Converged { details: None })
        } else {
            Ok(Outcome::Unchanged)
        }
    }
}

fn chown(path: &Path, uid: u32, gid: u32) -> Result<()> {
    std::os::unix::fs::chown(path, Some(uid), Some(gid))
        .with_context(|| format!("Failed to chown {} to uid {}", path.display(), uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::ReconcileError;
    use tempfile::TempDir;

    /// Name of the account owning `path`, via the user database
    fn owner_name_of(path: &Path) -> Option<String> {
        let uid = fs::metadata(path).ok()?.uid();
        let output = Command::new("getent")
            .args(["passwd", &uid.to_string()])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.split(':').next().map(str::to_string)
    }

    #[test]
    fn parses_owner_ids() {
        assert_eq!(
            parse_owner_ids("valhalla:x:1001:1002::/home/valhalla:/bin/bash"),
            Some((1001, 1002))
        );
        assert_eq!(parse_owner_ids("short:x:1"), None);
    }

    #[test]
    fn unresolvable_owner_fails_before_creation() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("checkouts");
        let dir = Directory::new(&target, "no-such-account-zz");

        let err = dir.apply(&mut ApplyContext::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::OwnerUnresolved { .. })
        ));
        // Resolution happens first, so nothing was created
        assert!(!target.exists());
    }

    #[test]
    fn path_collision_is_reported() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("occupied");
        fs::write(&target, b"a file").unwrap();

        let Some(owner) = owner_name_of(tmp.path()) else {
            return; // no passwd entry for the current uid
        };
        let dir = Directory::new(&target, owner);

        let err = dir.apply(&mut ApplyContext::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::PathCollision { .. })
        ));
    }

    #[test]
    fn creates_then_reports_unchanged() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("checkouts");

        let Some(owner) = owner_name_of(tmp.path()) else {
            return;
        };
        let dir = Directory::new(&target, owner);

        let first = dir.apply(&mut ApplyContext::default()).unwrap();
        assert!(first.is_change());
        assert!(target.is_dir());
        assert_eq!(
            fs::metadata(&target).unwrap().permissions().mode() & 0o7777,
            0o755
        );

        let second = dir.apply(&mut ApplyContext::default()).unwrap();
        assert_eq!(second, Outcome::Unchanged);
    }

    #[test]
    fn fixes_drifted_mode() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("checkouts");
        fs::create_dir(&target).unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o700)).unwrap();

        let Some(owner) = owner_name_of(tmp.path()) else {
            return;
        };
        let dir = Directory::new(&target, owner);

        assert!(matches!(
            dir.current_state().unwrap(),
            ResourceState::Modified { .. }
        ));

        let outcome = dir.apply(&mut ApplyContext::default()).unwrap();
        assert!(outcome.is_change());
        assert_eq!(
            fs::metadata(&target).unwrap().permissions().mode() & 0o7777,
            0o755
        );
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("checkouts");
        let dir = Directory::new(&target, "whoever");

        let outcome = dir.apply(&mut ApplyContext::new(true, false)).unwrap();
        assert!(matches!(outcome, Outcome::Skipped { .. }));
        assert!(!target.exists());
    }
}
