//! Error and reason types shared across the resolver.
//!
//! Callers branch on kinds rather than catching broad error classes:
//! malformed input is a precondition failure and always surfaces, while
//! remote failures are folded into not-found outcomes that carry an
//! explicit reason code.

use std::fmt;

use thiserror::Error;

/// The external `git` tool exited non-zero or could not be spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("git {args:?} failed: {stderr}")]
pub struct ProcessError {
    /// Arguments the tool was invoked with.
    pub args: Vec<String>,
    /// Exit status, when the process ran at all.
    pub status: Option<i32>,
    /// Trimmed stderr output, or the spawn error.
    pub stderr: String,
}

/// Failure of a single remote query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitError {
    /// Malformed input, detected before any remote call is attempted.
    #[error("{0}")]
    Precondition(String),
    /// The external git process failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Why a lookup produced no commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The remote answered, but no ref matched.
    RefNotFound,
    /// The remote's tags were listed, but none satisfied the range.
    NoMatchingTag,
    /// The remote could not be queried at all.
    RemoteUnreachable,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RefNotFound => "no matching ref exists on the remote",
            Self::NoMatchingTag => "no tag satisfies the requested range",
            Self::RemoteUnreachable => "the remote could not be queried",
        })
    }
}

/// Failure of a full resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Malformed input, detected before any remote call is attempted.
    #[error("{0}")]
    Precondition(String),
    /// No commit could be determined for the reference.
    #[error("could not resolve {wanted} to a commit of {repo}: {reason}")]
    Unresolvable {
        repo: String,
        wanted: String,
        reason: NotFoundReason,
    },
    /// The task driving an async resolution stopped before finishing.
    #[error("resolution task was cancelled: {0}")]
    Cancelled(String),
}
