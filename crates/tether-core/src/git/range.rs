//! Semver ranges in the npm dialect.
//!
//! The `semver` crate parses single requirement sets with caret-by-default
//! semantics; npm ranges additionally allow `||` unions, hyphen ranges,
//! wildcard components, and treat a bare version as exact. This module
//! translates the npm dialect into `VersionReq` sets before matching.

use semver::{Version, VersionReq};

use crate::error::GitError;

/// An npm-style version range: one or more `VersionReq` alternatives.
#[derive(Debug, Clone)]
pub(crate) struct Range {
    alternatives: Vec<VersionReq>,
}

impl Range {
    pub(crate) fn parse(input: &str) -> Result<Range, GitError> {
        let alternatives = input
            .split("||")
            .map(|alt| translate(alt.trim()))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|msg| GitError::Precondition(format!("invalid semver range {input:?}: {msg}")))?;
        Ok(Range { alternatives })
    }

    pub(crate) fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

fn translate(alt: &str) -> Result<VersionReq, String> {
    if alt.is_empty() {
        return Ok(VersionReq::STAR);
    }
    let tokens: Vec<&str> = alt.split_whitespace().collect();
    if tokens.len() == 3 && tokens[1] == "-" {
        return hyphen(tokens[0], tokens[2]);
    }
    let mut comparators = Vec::new();
    for token in &tokens {
        let comp = comparator(token)?;
        // A lone star adds nothing next to real comparators.
        if comp == "*" && tokens.len() > 1 {
            continue;
        }
        comparators.push(comp);
    }
    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", ")).map_err(|e| e.to_string())
}

fn hyphen(lower: &str, upper: &str) -> Result<VersionReq, String> {
    let lower = trim_wildcards(lower.trim_start_matches('v'));
    let upper = trim_wildcards(upper.trim_start_matches('v'));
    if lower.is_empty() || upper.is_empty() {
        return Err("empty bound in hyphen range".to_string());
    }
    // A partial upper bound widens: `1.0.0 - 1.2` means `<1.3.0`, which is
    // exactly how the semver crate reads `<=1.2`.
    VersionReq::parse(&format!(">={lower}, <={upper}")).map_err(|e| e.to_string())
}

// Cuts the version at the first wildcard or empty component. Prerelease
// suffixes stay attached so a bound like `1.0.0-alpha` keeps its opt-in.
fn trim_wildcards(version: &str) -> String {
    version
        .split('.')
        .take_while(|part| !part.is_empty() && !is_wild(part))
        .collect::<Vec<_>>()
        .join(".")
}

fn comparator(token: &str) -> Result<String, String> {
    for op in [">=", "<=", ">", "<", "=", "^", "~"] {
        if let Some(rest) = token.strip_prefix(op) {
            let rest = rest.trim_start_matches('v');
            if rest.is_empty() {
                return Err(format!("operator {op:?} without a version"));
            }
            return Ok(format!("{op}{rest}"));
        }
    }
    bare(token)
}

fn is_wild(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

// A bare version is an exact match in the npm dialect, with wildcard
// components opening the corresponding tail.
fn bare(token: &str) -> Result<String, String> {
    let token = token.trim_start_matches('v');
    if is_wild(token) {
        return Ok("*".to_string());
    }
    let parts: Vec<&str> = token.splitn(3, '.').collect();
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    match parts.as_slice() {
        [major] if numeric(major) => Ok(format!("={major}")),
        [major, minor] if numeric(major) => {
            if is_wild(minor) {
                Ok(format!("={major}"))
            } else if numeric(minor) {
                Ok(format!("={major}.{minor}"))
            } else {
                Err(format!("unparseable version {token:?}"))
            }
        }
        [major, minor, patch] if numeric(major) => {
            if is_wild(minor) {
                Ok(format!("={major}"))
            } else if !numeric(minor) {
                Err(format!("unparseable version {token:?}"))
            } else if is_wild(patch) {
                Ok(format!("={major}.{minor}"))
            } else {
                Ok(format!("={token}"))
            }
        }
        _ => Err(format!("unparseable version {token:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(range: &str, version: &str) -> bool {
        Range::parse(range)
            .unwrap()
            .matches(&Version::parse(version).unwrap())
    }

    #[test]
    fn bare_versions_are_exact() {
        assert!(matches("1.2.3", "1.2.3"));
        assert!(!matches("1.2.3", "1.2.4"));
        assert!(!matches("1.2.3", "1.9.0"));
    }

    #[test]
    fn partial_versions_open_the_tail() {
        assert!(matches("1.2", "1.2.0"));
        assert!(matches("1.2", "1.2.9"));
        assert!(!matches("1.2", "1.3.0"));
        assert!(matches("1", "1.9.9"));
        assert!(!matches("1", "2.0.0"));
        assert!(matches("1.x", "1.5.0"));
        assert!(matches("1.2.x", "1.2.7"));
        assert!(!matches("1.2.x", "1.3.0"));
    }

    #[test]
    fn stars_match_everything_stable() {
        assert!(matches("*", "0.0.1"));
        assert!(matches("x", "3.2.1"));
        assert!(matches("", "1.0.0"));
    }

    #[test]
    fn unions_take_either_side() {
        assert!(matches("^1.0.0 || ^2.0.0", "1.5.0"));
        assert!(matches("^1.0.0 || ^2.0.0", "2.1.0"));
        assert!(!matches("^1.0.0 || ^2.0.0", "3.0.0"));
    }

    #[test]
    fn hyphen_ranges_are_inclusive() {
        assert!(matches("1.0.0 - 1.2.0", "1.0.0"));
        assert!(matches("1.0.0 - 1.2.0", "1.2.0"));
        assert!(!matches("1.0.0 - 1.2.0", "1.2.1"));
    }

    #[test]
    fn hyphen_ranges_widen_partial_upper_bounds() {
        assert!(matches("1.0.0 - 1.2", "1.2.9"));
        assert!(!matches("1.0.0 - 1.2", "1.3.0"));
        assert!(matches("1.0.0 - 2", "2.9.9"));
        assert!(!matches("1.0.0 - 2", "3.0.0"));
    }

    #[test]
    fn hyphen_ranges_keep_prerelease_bounds() {
        assert!(matches("1.0.0-alpha - 2.0.0", "1.0.0-beta"));
        assert!(matches("1.0.0-alpha - 2.0.0", "1.0.0-alpha"));
        assert!(matches("1.0.0-alpha - 2.0.0", "1.5.0"));
        assert!(!matches("1.0.0-alpha - 2.0.0", "2.0.1"));
        // Prereleases of other versions still need their own opt-in.
        assert!(!matches("1.0.0-alpha - 2.0.0", "1.5.0-rc.1"));
    }

    #[test]
    fn v_prefixes_are_tolerated() {
        assert!(matches("v1.2.3", "1.2.3"));
        assert!(matches("^v1.0.0", "1.5.0"));
        assert!(matches("v1.0.0 - v1.2.0", "1.1.0"));
    }

    #[test]
    fn prereleases_need_an_opt_in() {
        assert!(!matches("^1.0.0", "2.0.0-beta.1"));
        assert!(matches(">=1.0.0-alpha <1.0.0", "1.0.0-beta"));
    }

    #[test]
    fn comparator_pairs_intersect() {
        assert!(matches(">=1.0.0 <2.0.0", "1.9.0"));
        assert!(!matches(">=1.0.0 <2.0.0", "2.0.0"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Range::parse("not-a-range").is_err());
        assert!(Range::parse(">=").is_err());
        assert!(Range::parse("1.0.0 - ").is_err());
    }
}
