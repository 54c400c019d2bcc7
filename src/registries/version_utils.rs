//! Version parsing and comparison utilities for action refs.
//!
//! Action refs are free-form git refs. Only some of them look like versions
//! (`v4`, `v2.3.4`, `1.0.0-beta.1`); those are the refs that get a derived
//! version on the dependency.

use std::cmp::Ordering;

/// Checks whether a git ref spells a version.
///
/// Accepts an optional leading `v`, a numeric first component, further
/// dot-separated alphanumeric components and an optional hyphenated
/// prerelease. Full commit ids are never treated as versions even when they
/// happen to be all digits.
pub fn is_valid_version(git_ref: &str) -> bool {
    if is_full_commit_sha(git_ref) {
        return false;
    }

    let stripped = git_ref.strip_prefix('v').unwrap_or(git_ref);
    let (release, prerelease) = match stripped.split_once('-') {
        Some((release, pre)) => (release, Some(pre)),
        None => (stripped, None),
    };

    let mut components = release.split('.');
    let first_is_numeric = components
        .next()
        .is_some_and(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()));
    if !first_is_numeric {
        return false;
    }
    if !components.all(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_alphanumeric())) {
        return false;
    }

    match prerelease {
        None => true,
        Some(pre) => pre
            .split('.')
            .all(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')),
    }
}

/// Normalizes a version-like ref by dropping the leading `v`.
///
/// Returns `None` when the ref is not a valid version.
pub fn normalize_version(git_ref: &str) -> Option<String> {
    if !is_valid_version(git_ref) {
        return None;
    }
    Some(git_ref.strip_prefix('v').unwrap_or(git_ref).to_string())
}

/// Checks whether a ref is a full 40 character commit id
pub fn is_full_commit_sha(git_ref: &str) -> bool {
    git_ref.len() == 40 && git_ref.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Checks whether a ref could be an abbreviated or full commit id
pub fn looks_like_commit_sha(git_ref: &str) -> bool {
    (7..=40).contains(&git_ref.len()) && git_ref.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Compare two version-like refs
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_stripped = a.strip_prefix('v').unwrap_or(a);
    let b_stripped = b.strip_prefix('v').unwrap_or(b);

    match (parse_padded(a_stripped), parse_padded(b_stripped)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        _ => compare_version_strings(a_stripped, b_stripped),
    }
}

/// Parse as semver, padding `2` and `2.3` out to three components
fn parse_padded(version: &str) -> Option<semver::Version> {
    let (release, rest) = match version.find(['-', '+']) {
        Some(pos) => version.split_at(pos),
        None => (version, ""),
    };
    let padded = match release.split('.').count() {
        1 => format!("{release}.0.0{rest}"),
        2 => format!("{release}.0{rest}"),
        _ => version.to_string(),
    };
    semver::Version::parse(&padded).ok()
}

/// Simple version string comparison
fn compare_version_strings(a: &str, b: &str) -> Ordering {
    let parse_parts = |s: &str| -> Vec<u64> {
        s.split(|c: char| !c.is_ascii_digit())
            .filter_map(|p| p.parse().ok())
            .collect()
    };

    let parts_a = parse_parts(a);
    let parts_b = parse_parts(b);

    for (pa, pb) in parts_a.iter().zip(parts_b.iter()) {
        match pa.cmp(pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    parts_a.len().cmp(&parts_b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_version() {
        assert!(is_valid_version("v2.3.4"));
        assert!(is_valid_version("2.3.4"));
        assert!(is_valid_version("v4"));
        assert!(is_valid_version("v1.2"));
        assert!(is_valid_version("1.0.0-beta.1"));
        assert!(is_valid_version("v3.0.0-rc-2"));
        assert!(!is_valid_version("main"));
        assert!(!is_valid_version("releases/v1"));
        assert!(!is_valid_version("v"));
        assert!(!is_valid_version(""));
        assert!(!is_valid_version("v1..2"));
        assert!(!is_valid_version("1.0.0-"));
        assert!(!is_valid_version("a5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a3b4"));
        assert!(!is_valid_version("1234567890123456789012345678901234567890"));
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("v2.3.4"), Some("2.3.4".to_string()));
        assert_eq!(normalize_version("v2"), Some("2".to_string()));
        assert_eq!(normalize_version("3.0.0"), Some("3.0.0".to_string()));
        assert_eq!(normalize_version("main"), None);
    }

    #[test]
    fn test_commit_sha_detection() {
        let sha = "8f4b7f84864484a7bf31766abe9204da3cbe65b3";
        assert!(is_full_commit_sha(sha));
        assert!(looks_like_commit_sha(sha));
        assert!(looks_like_commit_sha("8f4b7f8"));
        assert!(!is_full_commit_sha("8f4b7f8"));
        assert!(!looks_like_commit_sha("8f4b7f"));
        assert!(!looks_like_commit_sha("v2.3.4"));
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("v1.0.0", "v2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("v2.0.0", "v1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("v1.10.0", "v1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("v3", "v3.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("v3.1", "v3.0.5"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0-beta.1", "1.0.0"), Ordering::Less);
    }
}
