//! Hosted git providers and their tarball endpoints.
//!
//! A reference that points at a known provider over a non-ssh transport can
//! be resolved to a tarball URL instead of a clone, which fetchers download
//! without needing git at all.

use serde::{Deserialize, Serialize};

/// A git hosting provider with a known tarball endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Github, Provider::Gitlab, Provider::Bitbucket];

    /// Shorthand label, as written in `github:user/project` style refs.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
            Provider::Bitbucket => "bitbucket",
        }
    }

    /// Canonical hostname of the provider.
    pub fn host(&self) -> &'static str {
        match self {
            Provider::Github => "github.com",
            Provider::Gitlab => "gitlab.com",
            Provider::Bitbucket => "bitbucket.org",
        }
    }

    /// Matches a URL host against the known providers, ignoring a `www.`
    /// prefix.
    pub fn from_host(host: &str) -> Option<Provider> {
        let host = host.strip_prefix("www.").unwrap_or(host);
        Provider::ALL.into_iter().find(|p| p.host() == host)
    }
}

/// A repository on a known hosting provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSpec {
    pub provider: Provider,
    pub user: String,
    pub project: String,
}

impl HostedSpec {
    pub fn new(provider: Provider, user: impl Into<String>, project: impl Into<String>) -> Self {
        HostedSpec {
            provider,
            user: user.into(),
            project: project.into(),
        }
    }

    /// Normalized shorthand, e.g. `github:zkochan/is-negative`.
    pub fn shorthand(&self) -> String {
        format!("{}:{}/{}", self.provider.label(), self.user, self.project)
    }

    /// Clone URL over https.
    pub fn https_url(&self) -> String {
        format!(
            "https://{}/{}/{}.git",
            self.provider.host(),
            self.user,
            self.project
        )
    }

    /// Clone URL over ssh.
    pub fn ssh_url(&self) -> String {
        format!(
            "ssh://git@{}/{}/{}.git",
            self.provider.host(),
            self.user,
            self.project
        )
    }

    /// Tarball download URL for a specific commit.
    pub fn tarball_url(&self, committish: &str) -> String {
        match self.provider {
            Provider::Github => format!(
                "https://codeload.github.com/{}/{}/tar.gz/{}",
                self.user, self.project, committish
            ),
            Provider::Bitbucket => format!(
                "https://bitbucket.org/{}/{}/get/{}.tar.gz",
                self.user, self.project, committish
            ),
            Provider::Gitlab => format!(
                "https://gitlab.com/api/v4/projects/{}%2F{}/repository/archive.tar.gz?sha={}",
                self.user, self.project, committish
            ),
        }
    }
}

/// Whether a repository URL uses an ssh transport.
pub fn is_ssh(url: &str) -> bool {
    url.starts_with("ssh://") || url.starts_with("git+ssh://") || url.starts_with("git@")
}

/// Builds the package id for a commit-pinned git resolution.
///
/// The id is the repo URL prefixed with `git+` (unless already present),
/// followed by the commit and an optional subdirectory marker.
pub fn hosted_pkg_id(repo: &str, commit: &str, path: Option<&str>) -> String {
    let prefix = if repo.starts_with("git+") { "" } else { "git+" };
    let mut id = format!("{prefix}{repo}#{commit}");
    if let Some(path) = path {
        id.push_str("&path:");
        id.push_str(path);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_tarball_url() {
        let spec = HostedSpec::new(Provider::Github, "zkochan", "is-negative");
        assert_eq!(
            spec.tarball_url("163360a8d3ae6bee9524541043197ff356f8ed99"),
            "https://codeload.github.com/zkochan/is-negative/tar.gz/163360a8d3ae6bee9524541043197ff356f8ed99"
        );
    }

    #[test]
    fn bitbucket_tarball_url() {
        let spec = HostedSpec::new(Provider::Bitbucket, "pnpmjs", "git-resolver");
        assert_eq!(
            spec.tarball_url("988c61e11dc8d9ca0b5580cb15291951812549dc"),
            "https://bitbucket.org/pnpmjs/git-resolver/get/988c61e11dc8d9ca0b5580cb15291951812549dc.tar.gz"
        );
    }

    #[test]
    fn gitlab_tarball_url_percent_encodes_the_project_path() {
        let spec = HostedSpec::new(Provider::Gitlab, "pnpm", "git-resolver");
        assert_eq!(
            spec.tarball_url("988c61e11dc8d9ca0b5580cb15291951812549dc"),
            "https://gitlab.com/api/v4/projects/pnpm%2Fgit-resolver/repository/archive.tar.gz?sha=988c61e11dc8d9ca0b5580cb15291951812549dc"
        );
    }

    #[test]
    fn clone_urls() {
        let spec = HostedSpec::new(Provider::Github, "zkochan", "is-negative");
        assert_eq!(spec.https_url(), "https://github.com/zkochan/is-negative.git");
        assert_eq!(spec.ssh_url(), "ssh://git@github.com/zkochan/is-negative.git");
        assert_eq!(spec.shorthand(), "github:zkochan/is-negative");
    }

    #[test]
    fn from_host_ignores_www_prefix() {
        assert_eq!(Provider::from_host("www.github.com"), Some(Provider::Github));
        assert_eq!(Provider::from_host("gitlab.com"), Some(Provider::Gitlab));
        assert_eq!(Provider::from_host("example.com"), None);
    }

    #[test]
    fn pkg_id_prefixes_git_plus_once() {
        assert_eq!(
            hosted_pkg_id("https://github.com/a/b.git", "abc1234", None),
            "git+https://github.com/a/b.git#abc1234"
        );
        assert_eq!(
            hosted_pkg_id("git+ssh://git@github.com/a/b.git", "abc1234", None),
            "git+ssh://git@github.com/a/b.git#abc1234"
        );
    }

    #[test]
    fn pkg_id_appends_the_subdirectory() {
        assert_eq!(
            hosted_pkg_id("https://github.com/a/b.git", "abc1234", Some("packages/core")),
            "git+https://github.com/a/b.git#abc1234&path:packages/core"
        );
    }

    #[test]
    fn ssh_detection() {
        assert!(is_ssh("ssh://git@github.com/a/b.git"));
        assert!(is_ssh("git+ssh://git@github.com/a/b.git"));
        assert!(is_ssh("git@github.com:a/b.git"));
        assert!(!is_ssh("https://github.com/a/b.git"));
        assert!(!is_ssh("git://github.com/a/b.git"));
    }
}
