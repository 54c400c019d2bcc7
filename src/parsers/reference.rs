//! Action reference grammar
//!
//! A repository reference has the shape `owner/repo[/path]@ref`:
//!
//! - `owner` and `repo` are non-empty runs of ASCII word characters, `.` or `-`
//! - `path` is an optional `/...` segment that may not contain `@`
//! - `ref` is everything after the first `@`, up to the end of the line. It
//!   may contain slashes and dots (`releases/v1.2`).
//!
//! Local actions (`./path`) and container actions (`docker://image`) are
//! valid `uses` values but are not tracked as dependencies.

/// A reference that matched the repository grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub owner: String,
    pub repo: String,
    /// Sub-directory within the repository, including its leading `/`
    pub path: Option<String>,
    pub git_ref: String,
}

impl ParsedReference {
    /// Repository name in `owner/repo` form
    pub fn name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Classification of a raw `uses` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReference {
    /// An action in another repository
    Repository(ParsedReference),
    /// An action in the same repository (`./.github/actions/foo`)
    LocalPath,
    /// A container image (`docker://alpine:3.18`)
    DockerImage,
}

/// Match a raw reference against the repository grammar.
///
/// No exclusion prefixes are applied here; see [`classify_reference`].
pub fn match_reference(raw: &str) -> Option<ParsedReference> {
    let owner_len = name_prefix_len(raw);
    if owner_len == 0 {
        return None;
    }
    let (owner, rest) = raw.split_at(owner_len);
    let rest = rest.strip_prefix('/')?;

    let repo_len = name_prefix_len(rest);
    if repo_len == 0 {
        return None;
    }
    let (repo, rest) = rest.split_at(repo_len);

    let (path, git_ref) = if let Some(git_ref) = rest.strip_prefix('@') {
        (None, git_ref)
    } else if rest.starts_with('/') {
        let at = rest.find('@')?;
        // The path needs at least one character after its slash
        if at < 2 {
            return None;
        }
        (Some(&rest[..at]), &rest[at + 1..])
    } else {
        return None;
    };

    let git_ref = git_ref.lines().next().unwrap_or_default();
    if git_ref.is_empty() {
        return None;
    }

    Some(ParsedReference {
        owner: owner.to_string(),
        repo: repo.to_string(),
        path: path.map(str::to_string),
        git_ref: git_ref.to_string(),
    })
}

/// Classify a raw `uses` string.
///
/// Returns `None` for strings that are neither excluded nor grammatical.
pub fn classify_reference(raw: &str) -> Option<ActionReference> {
    if raw.starts_with('.') {
        return Some(ActionReference::LocalPath);
    }
    if raw.starts_with("docker://") {
        return Some(ActionReference::DockerImage);
    }
    match_reference(raw).map(ActionReference::Repository)
}

/// Length of the leading run of `[A-Za-z0-9_.-]`
fn name_prefix_len(s: &str) -> usize {
    s.bytes()
        .take_while(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-')
        .count()
}
