//! Error types for manifest parsing

use thiserror::Error;

/// Failure to turn manifest text into a [`Node`](crate::document::Node) tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("disallowed type {tag}")]
    DisallowedType { tag: String },

    #[error("malformed alias: {0}")]
    MalformedAlias(String),
}

/// Errors surfaced to callers of [`WorkflowParser`](crate::parsers::github_actions::WorkflowParser)
#[derive(Debug, Error)]
pub enum Error {
    /// A manifest could not be parsed. The whole run is aborted.
    #[error("{path} is not a parseable workflow manifest: {source}")]
    ManifestNotParseable {
        path: String,
        #[source]
        source: DocumentError,
    },

    #[error("no workflow manifests were supplied")]
    NoManifests,
}

impl Error {
    /// Path of the offending file, if the error is file-scoped
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::ManifestNotParseable { path, .. } => Some(path),
            Error::NoManifests => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_message_includes_path() {
        let err = Error::ManifestNotParseable {
            path: ".github/workflows/ci.yml".to_string(),
            source: DocumentError::Syntax("mapping values are not allowed".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains(".github/workflows/ci.yml"));
        assert!(message.contains("mapping values are not allowed"));
        assert_eq!(err.path(), Some(".github/workflows/ci.yml"));
    }

    #[test]
    fn test_no_manifests_has_no_path() {
        assert_eq!(Error::NoManifests.path(), None);
    }
}
