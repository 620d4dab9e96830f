//! Resolution of git references to immutable outcomes.
//!
//! A resolution pins a reference to something a fetcher can download
//! reproducibly: a commit on a git remote, or a hosted provider's tarball
//! URL for that commit when the provider is known and the transport allows
//! anonymous downloads.

use std::panic;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GitError, NotFoundReason, ResolveError};
use crate::git::{self, GitExec, Lookup, RefKind, SystemGit};
use crate::hosted::{hosted_pkg_id, is_ssh};
use crate::spec::{PackageSpec, Wanted};

/// Marker recorded on every result this resolver produces.
pub const RESOLVED_VIA: &str = "git-repository";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionKind {
    #[default]
    #[serde(rename = "git")]
    Git,
}

/// A commit pinned on a git remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitResolution {
    #[serde(rename = "type")]
    pub kind: ResolutionKind,
    pub repo: String,
    pub commit: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
}

/// A downloadable archive of a pinned commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarballResolution {
    pub tarball: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Git(GitResolution),
    Tarball(TarballResolution),
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
    pub id: String,
    pub normalized_pref: String,
    pub resolution: Resolution,
    pub resolved_via: String,
}

/// Resolves git dependency references.
#[derive(Clone)]
pub struct GitResolver {
    exec: Arc<dyn GitExec>,
}

impl Default for GitResolver {
    fn default() -> Self {
        GitResolver::new()
    }
}

impl GitResolver {
    pub fn new() -> GitResolver {
        GitResolver {
            exec: Arc::new(SystemGit),
        }
    }

    /// Uses a caller-supplied git executor instead of the system binary.
    pub fn with_exec(exec: Arc<dyn GitExec>) -> GitResolver {
        GitResolver { exec }
    }

    /// Async wrapper around [`GitResolver::resolve_blocking`].
    ///
    /// The remote query spawns external processes, so it runs on the
    /// blocking pool.
    pub async fn resolve(&self, pref: &str) -> Result<Option<ResolveResult>, ResolveError> {
        let resolver = self.clone();
        let pref = pref.to_string();
        match tokio::task::spawn_blocking(move || resolver.resolve_blocking(&pref)).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => Err(ResolveError::Cancelled(err.to_string())),
        }
    }

    /// Resolves a reference, returning `Ok(None)` when it is not a git
    /// reference at all.
    pub fn resolve_blocking(&self, pref: &str) -> Result<Option<ResolveResult>, ResolveError> {
        let Some(spec) = PackageSpec::parse(pref) else {
            return Ok(None);
        };
        self.resolve_spec(&spec).map(Some)
    }

    /// Resolves an already-parsed reference.
    pub fn resolve_spec(&self, spec: &PackageSpec) -> Result<ResolveResult, ResolveError> {
        let repo = self.pick_fetch_url(spec);
        let lookup = match &spec.wanted {
            Wanted::Head => git::resolve_sha(self.exec.as_ref(), &repo, "HEAD"),
            Wanted::Committish(c) => git::resolve_committish(self.exec.as_ref(), &repo, c),
            Wanted::Range(r) => git::resolve_range(self.exec.as_ref(), &repo, r),
        };
        let lookup = match lookup {
            Ok(lookup) => lookup,
            Err(GitError::Precondition(msg)) => return Err(ResolveError::Precondition(msg)),
            Err(GitError::Process(err)) => {
                tracing::debug!(repo = %repo, error = %err, "remote query failed");
                Lookup::NotFound(NotFoundReason::RemoteUnreachable)
            }
        };
        let commit = match lookup {
            Lookup::Found(commit) => commit,
            Lookup::NotFound(reason) => {
                return Err(ResolveError::Unresolvable {
                    repo,
                    wanted: spec.wanted.describe().to_string(),
                    reason,
                });
            }
        };

        // A tarball only works over anonymous transports.
        let tarball = spec
            .hosted
            .as_ref()
            .filter(|_| !is_ssh(&repo))
            .map(|hosted| hosted.tarball_url(&commit));

        let (id, resolution) = match tarball {
            Some(tarball) => {
                let id = match &spec.path {
                    Some(path) => format!("{tarball}#path:{path}"),
                    None => tarball.clone(),
                };
                let resolution = Resolution::Tarball(TarballResolution {
                    tarball,
                    path: spec.path.clone(),
                });
                (id, resolution)
            }
            None => {
                let id = hosted_pkg_id(&repo, &commit, spec.path.as_deref());
                let resolution = Resolution::Git(GitResolution {
                    kind: ResolutionKind::Git,
                    repo,
                    commit,
                    path: spec.path.clone(),
                });
                (id, resolution)
            }
        };

        Ok(ResolveResult {
            id,
            normalized_pref: spec.normalized_pref.clone(),
            resolution,
            resolved_via: RESOLVED_VIA.to_string(),
        })
    }

    /// Picks the URL remote queries run against.
    ///
    /// A hosted repository referenced over ssh is probed over the
    /// provider's https URL first; when the provider answers anonymously
    /// the https URL wins, which keeps tarball downloads available.
    /// Private repositories fail the probe and stay on ssh.
    fn pick_fetch_url(&self, spec: &PackageSpec) -> String {
        if let Some(hosted) = &spec.hosted
            && is_ssh(&spec.fetch_spec)
        {
            let https = hosted.https_url();
            match git::list_refs(self.exec.as_ref(), &https, RefKind::Refs) {
                Ok(_) => return https,
                Err(err) => {
                    tracing::debug!(repo = %https, error = %err, "https probe failed, staying on ssh");
                }
            }
        }
        spec.fetch_spec.clone()
    }

    /// Lists the semver tags of a repository, for error messaging.
    pub fn available_versions(&self, repo: &str) -> Result<Vec<String>, GitError> {
        git::tag_versions(self.exec.as_ref(), repo)
    }
}
