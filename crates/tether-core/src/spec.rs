//! Parsing of human-written git dependency references.
//!
//! A reference names a repository plus, optionally, what to pick from it:
//! `owner/repo`, `github:owner/repo#branch`, `git+ssh://git@host/p.git#v1`,
//! `https://gitlab.com/o/p#semver:^2.0.0`, with an optional `&path:subdir`
//! suffix selecting a subdirectory. Parsing is purely syntactic and never
//! touches the network; anything that does not look like a git reference is
//! simply not ours to resolve.

use url::Url;

use crate::hosted::{HostedSpec, Provider};

/// What the reference asks to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wanted {
    /// The remote's default branch.
    Head,
    /// A branch, tag, or commit sha.
    Committish(String),
    /// A semver range matched against the remote's tags.
    Range(String),
}

impl Wanted {
    /// Human-readable form for error messages.
    pub fn describe(&self) -> &str {
        match self {
            Wanted::Head => "HEAD",
            Wanted::Committish(c) => c,
            Wanted::Range(r) => r,
        }
    }
}

/// A parsed git dependency reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// URL handed to git for remote queries.
    pub fetch_spec: String,
    /// What to resolve within the repository.
    pub wanted: Wanted,
    /// Subdirectory holding the package, when not the repo root.
    pub path: Option<String>,
    /// Provider details, when the repository lives on a known host.
    pub hosted: Option<HostedSpec>,
    /// Canonical rendering of the reference: provider shorthand for hosted
    /// repositories, the reference as written otherwise.
    pub normalized_pref: String,
}

enum Target {
    Hosted { spec: HostedSpec, ssh: bool },
    Url(String),
}

impl PackageSpec {
    /// Parses a reference, returning `None` when it is not a git reference.
    pub fn parse(pref: &str) -> Option<PackageSpec> {
        let pref = pref.trim();
        if pref.is_empty() {
            return None;
        }
        let (base, fragment) = match pref.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (pref, None),
        };
        let (wanted, path) = parse_fragment(fragment);
        let target = parse_base(base)?;

        let (fetch_spec, hosted) = match target {
            Target::Hosted { spec, ssh } => {
                let url = if ssh { spec.ssh_url() } else { spec.https_url() };
                (url, Some(spec))
            }
            Target::Url(url) => (url, None),
        };

        // Hosted repositories normalize to provider shorthand; anything
        // else keeps the reference exactly as written.
        let normalized_pref = match &hosted {
            Some(spec) => render_normalized(&spec.shorthand(), &wanted, path.as_deref()),
            None => pref.to_string(),
        };

        Some(PackageSpec {
            fetch_spec,
            wanted,
            path,
            hosted,
            normalized_pref,
        })
    }
}

fn parse_fragment(fragment: Option<&str>) -> (Wanted, Option<String>) {
    let mut wanted = Wanted::Head;
    let mut path = None;
    let Some(fragment) = fragment else {
        return (wanted, path);
    };
    for part in fragment.split('&') {
        if let Some(p) = part.strip_prefix("path:") {
            if !p.is_empty() {
                path = Some(p.to_string());
            }
        } else if let Some(range) = part.strip_prefix("semver:") {
            wanted = Wanted::Range(range.to_string());
        } else if !part.is_empty() {
            wanted = Wanted::Committish(part.to_string());
        }
    }
    (wanted, path)
}

fn parse_base(base: &str) -> Option<Target> {
    for provider in Provider::ALL {
        if let Some(slug) = base.strip_prefix(provider.label())
            && let Some(slug) = slug.strip_prefix(':')
        {
            let spec = hosted_from_slug(provider, slug)?;
            return Some(Target::Hosted { spec, ssh: false });
        }
    }

    let stripped = base.strip_prefix("git+").unwrap_or(base);
    if stripped.contains("://") {
        return parse_url(stripped);
    }
    if let Some(rest) = base.strip_prefix("git@") {
        let (host, repo_path) = rest.split_once(':')?;
        return parse_url(&format!("ssh://git@{host}/{repo_path}"));
    }

    hosted_from_slug(Provider::Github, base).map(|spec| Target::Hosted { spec, ssh: false })
}

fn hosted_from_slug(provider: Provider, slug: &str) -> Option<HostedSpec> {
    let (user, project) = slug.split_once('/')?;
    let project = project.strip_suffix(".git").unwrap_or(project);
    if user.is_empty() || project.is_empty() || project.contains('/') {
        return None;
    }
    let valid = |s: &str| {
        !s.starts_with('.')
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !valid(user) || !valid(project) {
        return None;
    }
    Some(HostedSpec::new(provider, user, project))
}

fn parse_url(raw: &str) -> Option<Target> {
    let raw = if raw.starts_with("ssh://") {
        normalize_ssh(raw)
    } else {
        raw.to_string()
    };
    let url = Url::parse(&raw).ok()?;
    let ssh = match url.scheme() {
        "ssh" => true,
        "http" | "https" | "git" | "file" => false,
        _ => return None,
    };

    // Credentials embedded in non-ssh URLs force the generic git path so
    // they survive into the fetch spec.
    let credentialed = !url.username().is_empty() && !ssh;
    if !credentialed
        && let Some(host) = url.host_str()
        && let Some(provider) = Provider::from_host(host)
        && let Some(spec) = hosted_from_slug(provider, url.path().trim_matches('/'))
    {
        return Some(Target::Hosted { spec, ssh });
    }
    Some(Target::Url(raw))
}

/// Rewrites scp-style colons in an ssh URL's authority so it parses as a
/// standard URL: `ssh://git@host:path` becomes `ssh://git@host/path`, while
/// a real numeric port is left alone.
fn normalize_ssh(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix("ssh://") else {
        return raw.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let Some(colon) = authority.find(':') else {
        return raw.to_string();
    };
    let after = &authority[colon + 1..];
    let rewritten = match after.split_once(':') {
        // host:port:path keeps the numeric port and opens the path.
        Some((port, path)) if port.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}:{}/{}", &authority[..colon], port, path)
        }
        _ if after.chars().all(|c| c.is_ascii_digit()) && !after.is_empty() => {
            return raw.to_string();
        }
        _ => format!("{}/{}", &authority[..colon], after),
    };
    format!("ssh://{rewritten}{tail}")
}

fn render_normalized(base: &str, wanted: &Wanted, path: Option<&str>) -> String {
    let mut out = base.to_string();
    match wanted {
        Wanted::Head => {}
        Wanted::Committish(c) => {
            out.push('#');
            out.push_str(c);
        }
        Wanted::Range(r) => {
            out.push_str("#semver:");
            out.push_str(r);
        }
    }
    if let Some(path) = path {
        if matches!(wanted, Wanted::Head) {
            out.push_str("#path:");
        } else {
            out.push_str("&path:");
        }
        out.push_str(path);
    }
    out
}
