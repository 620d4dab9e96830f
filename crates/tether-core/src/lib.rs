//! Tether Core Library
//!
//! Resolves human-written git dependency references (owner/repo shorthand,
//! hosted-provider shorthand, ssh/https URLs, optionally pinned to a branch,
//! tag, commit, or semver range) into immutable, reproducible resolutions:
//! either a concrete commit on a git remote or a hosted-provider tarball URL,
//! optionally scoped to a subdirectory.

pub mod error;
pub mod git;
pub mod hosted;
pub mod resolver;
pub mod retry;
pub mod spec;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{GitError, NotFoundReason, ProcessError, ResolveError};

    // Remote queries
    pub use crate::git::{
        GitExec, Lookup, RefKind, RefMap, SystemGit, is_sha, list_refs, resolve_committish,
        resolve_range, resolve_sha, tag_versions,
    };

    // Hosted providers
    pub use crate::hosted::{HostedSpec, Provider, hosted_pkg_id, is_ssh};

    // Resolution
    pub use crate::resolver::{
        GitResolution, GitResolver, Resolution, ResolutionKind, ResolveResult, TarballResolution,
    };

    // Retry
    pub use crate::retry::{RetryError, RetryableError, retry};

    // Specs
    pub use crate::spec::{PackageSpec, Wanted};
}
