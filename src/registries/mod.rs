//! Clients for the source-control hosts that serve actions
//!
//! The parser never talks to the network directly. Every question it has
//! about a repository goes through [`RepositoryClient`], so callers can swap
//! in the GitHub client, an offline client, or a stub in tests.

/// A git dependency as seen by a repository client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitReference {
    /// Repository in `owner/repo` form
    pub name: String,
    /// The ref the manifest declared (tag, branch or commit)
    pub git_ref: String,
    /// Hostname of the source-control instance, e.g. `github.com`
    pub host: String,
}

/// Trait for repository clients
///
/// Answers are plain values rather than results: a transport failure is
/// reported as a negative answer.
/// Note: async_fn_in_trait is allowed because this trait is internal and already bounds Send + Sync
#[allow(async_fn_in_trait)]
pub trait RepositoryClient: Send + Sync {
    /// Whether `name` exists and is readable on `host`
    async fn is_reachable(&self, name: &str, host: &str) -> bool;

    /// Whether the ref is immutable (a commit id or a tag, not a moving branch)
    async fn is_pinned(&self, reference: &GitReference) -> bool;

    /// Find a version tag that points at the pinned commit, returning the tag name
    async fn resolve_pinned_version(&self, reference: &GitReference) -> Option<String>;
}

/// Client that never reaches the network.
///
/// Every repository is reported unreachable, so dependencies keep the fields
/// derived from the manifest alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

impl RepositoryClient for OfflineClient {
    async fn is_reachable(&self, _name: &str, _host: &str) -> bool {
        false
    }

    async fn is_pinned(&self, _reference: &GitReference) -> bool {
        false
    }

    async fn resolve_pinned_version(&self, _reference: &GitReference) -> Option<String> {
        None
    }
}

pub mod github;
pub mod http_client;
pub mod version_utils;
