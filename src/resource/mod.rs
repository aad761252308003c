//! Resource implementations for the provisioning plan
//!
//! Each module implements one declaration kind over its host backend:
//! - `user_account` over the OS user/group database (getent/useradd)
//! - `directory` over the filesystem
//! - `apt_package` over dpkg/apt-get
//! - `shell_fixup` over bash

pub mod apt_package;
pub mod directory;
pub mod shell_fixup;
pub mod user_account;

pub use apt_package::AptPackage;
pub use directory::Directory;
pub use shell_fixup::ShellFixup;
pub use user_account::UserAccount;
