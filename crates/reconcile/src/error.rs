//! Failure taxonomy for resource convergence
//!
//! Every way a declaration can fail against its backend has a named
//! variant, so callers can report failures with the resource description
//! attached instead of an opaque exit status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The OS account backend refused to create or adjust an account
    #[error("account creation failed for '{name}': {reason}")]
    AccountCreation { name: String, reason: String },

    /// A directory owner must already exist when the directory is declared
    #[error("directory '{path}': owner '{owner}' does not exist")]
    OwnerUnresolved { path: String, owner: String },

    /// The declared directory path is occupied by something else
    #[error("path '{path}' exists but is not a directory")]
    PathCollision { path: String },

    /// The package backend does not know the package name
    #[error("package '{name}' has no installation candidate")]
    UnresolvablePackage { name: String },

    /// The package backend failed for another reason (network, repository)
    #[error("package '{name}' install failed: {reason}")]
    PackageBackend { name: String, reason: String },

    /// A shell fixup exited non-zero
    #[error("script exited with status {code}: {stderr_tail}")]
    ShellExit { code: i32, stderr_tail: String },
}
