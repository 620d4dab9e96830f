//! Ref lookups against a git remote.
//!
//! Everything here goes through `git ls-remote`; no clone is ever made.
//! Remote failures during a lookup degrade to [`Lookup::NotFound`] with
//! [`NotFoundReason::RemoteUnreachable`] so callers can report one uniform
//! "could not resolve" outcome, while malformed input fails hard before any
//! process is spawned.

use std::collections::HashMap;

use semver::Version;

use crate::error::{GitError, NotFoundReason};
use crate::git::exec::GitExec;
use crate::git::range::Range;

/// Ref name to commit sha, as reported by the remote.
pub type RefMap = HashMap<String, String>;

/// Outcome of a lookup that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The commit sha the query resolved to.
    Found(String),
    /// Nothing matched, for the stated reason.
    NotFound(NotFoundReason),
}

/// Which refs to ask the remote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// All refs, excluding peeled `^{}` entries.
    Refs,
    /// Tags only, including peeled entries.
    Tags,
}

impl RefKind {
    fn flag(&self) -> &'static str {
        match self {
            RefKind::Refs => "--refs",
            RefKind::Tags => "--tags",
        }
    }
}

/// Whether `s` is a full or abbreviated commit sha.
pub fn is_sha(s: &str) -> bool {
    (7..=40).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

fn reject_whitespace(value: &str, what: &str) -> Result<(), GitError> {
    if value.chars().any(char::is_whitespace) {
        return Err(GitError::Precondition(format!(
            "{what} must not contain whitespace: {value:?}"
        )));
    }
    Ok(())
}

/// Lists the remote's refs as a name-to-commit map.
pub fn list_refs(exec: &dyn GitExec, repo: &str, kind: RefKind) -> Result<RefMap, GitError> {
    reject_whitespace(repo, "repository URL")?;
    let stdout = exec.run(&["ls-remote", kind.flag(), repo])?;
    let mut refs = RefMap::new();
    for line in stdout.lines() {
        if let Some((commit, name)) = line.split_once('\t') {
            refs.insert(name.to_string(), commit.to_string());
        }
    }
    Ok(refs)
}

/// Asks the remote for a single ref, e.g. `HEAD` or a branch name.
pub fn resolve_sha(exec: &dyn GitExec, repo: &str, reference: &str) -> Result<Lookup, GitError> {
    reject_whitespace(repo, "repository URL")?;
    reject_whitespace(reference, "ref")?;
    let stdout = exec.run(&["ls-remote", repo, reference])?;
    let commit = stdout
        .lines()
        .next()
        .and_then(|line| line.split('\t').next())
        .unwrap_or("")
        .to_string();
    if commit.is_empty() {
        return Ok(Lookup::NotFound(NotFoundReason::RefNotFound));
    }
    Ok(Lookup::Found(commit))
}

/// Resolves a branch, tag, or sha to a commit.
///
/// A well-formed sha passes through without touching the remote. Otherwise
/// the remote's refs are listed once and probed in order: the literal name,
/// then under `refs/`, then as an annotated tag, a lightweight tag, and a
/// branch.
pub fn resolve_committish(
    exec: &dyn GitExec,
    repo: &str,
    committish: &str,
) -> Result<Lookup, GitError> {
    reject_whitespace(repo, "repository URL")?;
    reject_whitespace(committish, "committish")?;
    if is_sha(committish) {
        return Ok(Lookup::Found(committish.to_string()));
    }
    let refs = match list_refs(exec, repo, RefKind::Refs) {
        Ok(refs) => refs,
        Err(GitError::Process(err)) => {
            tracing::debug!(repo, error = %err, "ref listing failed");
            return Ok(Lookup::NotFound(NotFoundReason::RemoteUnreachable));
        }
        Err(err) => return Err(err),
    };
    let candidates = [
        committish.to_string(),
        format!("refs/{committish}"),
        format!("refs/tags/{committish}^{{}}"),
        format!("refs/tags/{committish}"),
        format!("refs/heads/{committish}"),
    ];
    for candidate in &candidates {
        if let Some(commit) = refs.get(candidate) {
            return Ok(Lookup::Found(commit.clone()));
        }
    }
    Ok(Lookup::NotFound(NotFoundReason::RefNotFound))
}

/// Resolves a semver range to the commit of the highest matching tag.
///
/// Tags that do not parse as versions are skipped. The winning tag's peeled
/// `^{}` entry is preferred so an annotated tag resolves to the commit it
/// points at, not the tag object.
pub fn resolve_range(exec: &dyn GitExec, repo: &str, range: &str) -> Result<Lookup, GitError> {
    reject_whitespace(repo, "repository URL")?;
    let range = Range::parse(range)?;
    let refs = match list_refs(exec, repo, RefKind::Tags) {
        Ok(refs) => refs,
        Err(GitError::Process(err)) => {
            tracing::debug!(repo, error = %err, "tag listing failed");
            return Ok(Lookup::NotFound(NotFoundReason::RemoteUnreachable));
        }
        Err(err) => return Err(err),
    };
    let mut best: Option<(Version, String)> = None;
    for name in refs.keys() {
        let Some(tag) = name.strip_prefix("refs/tags/") else {
            continue;
        };
        let tag = tag.strip_suffix("^{}").unwrap_or(tag);
        let Ok(version) = Version::parse(tag.strip_prefix('v').unwrap_or(tag)) else {
            continue;
        };
        if !range.matches(&version) {
            continue;
        }
        if best.as_ref().is_none_or(|(cur, _)| version > *cur) {
            best = Some((version, tag.to_string()));
        }
    }
    let Some((_, tag)) = best else {
        return Ok(Lookup::NotFound(NotFoundReason::NoMatchingTag));
    };
    let commit = refs
        .get(&format!("refs/tags/{tag}^{{}}"))
        .or_else(|| refs.get(&format!("refs/tags/{tag}")));
    match commit {
        Some(commit) => Ok(Lookup::Found(commit.clone())),
        None => Ok(Lookup::NotFound(NotFoundReason::NoMatchingTag)),
    }
}

/// Lists the remote's semver-shaped tags in ascending version order.
pub fn tag_versions(exec: &dyn GitExec, repo: &str) -> Result<Vec<String>, GitError> {
    let refs = list_refs(exec, repo, RefKind::Tags)?;
    let mut versions: Vec<Version> = refs
        .keys()
        .filter_map(|name| name.strip_prefix("refs/tags/"))
        .map(|tag| tag.strip_suffix("^{}").unwrap_or(tag))
        .filter_map(|tag| Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok())
        .collect();
    versions.sort();
    versions.dedup();
    Ok(versions.into_iter().map(|v| v.to_string()).collect())
}
