//! Remote git queries over `git ls-remote`.

pub mod exec;
mod range;
pub mod remote;

#[cfg(test)]
pub(crate) mod testing;

pub use exec::{GitExec, SystemGit};
pub use remote::{
    Lookup, RefKind, RefMap, is_sha, list_refs, resolve_committish, resolve_range, resolve_sha,
    tag_versions,
};
