//! Plan construction - from config to an ordered list of declarations
//!
//! The plan is fixed in shape: account, checkout directory, toolchain
//! packages, compiler-alternatives fixup. Order matters and is strictly
//! forward: the directory is owned by the account, the fixup references
//! compilers the package steps install.

use crate::config::NodeConfig;
use crate::resource::{AptPackage, Directory, ShellFixup, UserAccount};
use anyhow::Result;
use reconcile::{BoxedResource, Resource};

/// Build toolchain for the valhalla routing engine, in install order
pub const TOOLCHAIN_PACKAGES: [&str; 16] = [
    "autoconf",
    "automake",
    "libtool",
    "make",
    "gcc-4.8",
    "g++-4.8",
    "libpython2.7-dev",
    "libboost1.54-dev",
    "libboost-python1.54-dev",
    "libboost-program-options1.54-dev",
    "libboost-filesystem1.54-dev",
    "libboost-system1.54-dev",
    "protobuf-compiler",
    "libprotobuf-dev",
    "lua5.2",
    "liblua5.2-dev",
];

/// Registers the pinned compilers as the system default
const UPDATE_ALTERNATIVES: &str = "\
update-alternatives --install /usr/bin/gcc gcc /usr/bin/gcc-4.8 90
update-alternatives --install /usr/bin/g++ g++ /usr/bin/g++-4.8 90
";

/// Caller-selected knobs that feed into declarations
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Accept packages from unauthenticated repositories
    pub allow_unauthenticated: bool,
}

/// Build the full ordered plan from a loaded config
///
/// Pure apart from config reads: identical config and options always yield
/// an identical plan, which is what makes dry-run previews trustworthy.
pub fn build_plan(config: &NodeConfig, opts: &PlanOptions) -> Result<Vec<BoxedResource>> {
    let user_name = config.user_name()?.to_string();
    let user_home = config.user_home()?;
    let basedir = config.basedir()?;

    let account = UserAccount::new(user_name.clone(), user_home);
    let account_id = account.id();

    let mut plan: Vec<BoxedResource> = Vec::with_capacity(TOOLCHAIN_PACKAGES.len() + 3);

    plan.push(Box::new(account));
    plan.push(Box::new(
        Directory::new(basedir, user_name)
            .with_mode(0o755)
            .after(account_id),
    ));

    for name in TOOLCHAIN_PACKAGES {
        plan.push(Box::new(
            AptPackage::new(name).with_allow_unauthenticated(opts.allow_unauthenticated),
        ));
    }

    plan.push(Box::new(
        ShellFixup::new("update-alternatives", UPDATE_ALTERNATIVES)
            .after("pkg:gcc-4.8")
            .after("pkg:g++-4.8"),
    ));

    Ok(plan)
}
