//! # GitHub Repository Client
//!
//! Answers reachability, pin and tag questions about action repositories
//! using the GitHub REST API. The same client serves github.com and GitHub
//! Enterprise Server instances; the API base for each host comes from
//! [`SourceConfig::api_base`].
//!
//! ## API Endpoints Used
//!
//! - `GET /repos/{owner}/{repo}`: repository exists and is readable
//! - `GET /repos/{owner}/{repo}/git/ref/tags/{ref}`: whether a ref names a tag
//! - `GET /repos/{owner}/{repo}/branches/{ref}`: whether a ref names a branch
//! - `GET /repos/{owner}/{repo}/tags?per_page=100`: tag names with commit ids,
//!   paginated through the `Link` header
//!
//! ## Error Handling
//!
//! Every failure (transport error, non-success status, undecodable body) is
//! logged and folded into a negative answer. Callers never see an error.
//!
//! ## Caching
//!
//! Reachability is memoized per `(host, repository)` for the lifetime of the
//! client, since the same action is usually referenced from many workflows.

use std::sync::Arc;

use dashmap::DashMap;
use reqwest::header::LINK;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::version_utils::{
    compare_versions, is_full_commit_sha, is_valid_version, looks_like_commit_sha,
};
use super::{GitReference, RepositoryClient};
use crate::config::SourceConfig;

/// Upper bound on tag pages read while resolving one commit
const MAX_TAG_PAGES: usize = 10;

/// Client for the GitHub REST API
pub struct GitHubClient {
    client: Arc<Client>,
    source: SourceConfig,
    reachable: DashMap<(String, String), bool>,
}

impl GitHubClient {
    /// Creates a GitHubClient that uses the provided shared HTTP client.
    ///
    /// `source` decides which API base each host maps to.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use actions_deps::config::SourceConfig;
    /// use actions_deps::registries::github::GitHubClient;
    /// use actions_deps::registries::http_client::create_shared_client;
    ///
    /// let client = create_shared_client().expect("failed to create client");
    /// let github = GitHubClient::with_client(client, SourceConfig::default());
    /// ```
    pub fn with_client(client: Arc<Client>, source: SourceConfig) -> Self {
        Self {
            client,
            source,
            reachable: DashMap::new(),
        }
    }

    pub fn http_client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    /// Build `{api}/repos/{owner}/{repo}/{segments...}` with each part escaped
    fn repo_url(&self, host: &str, name: &str, segments: &[&str]) -> Option<Url> {
        let mut url = Url::parse(&self.source.api_base(host)).ok()?;
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty().push("repos");
            for part in name.split('/') {
                path.push(part);
            }
            for segment in segments {
                path.push(segment);
            }
        }
        Some(url)
    }

    /// Fetch a URL, returning its status, or `None` on transport failure
    async fn status(&self, url: Url) -> Option<StatusCode> {
        match self.client.get(url.clone()).send().await {
            Ok(response) => Some(response.status()),
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                None
            }
        }
    }

    /// Whether the ref names a branch. `None` when the host could not answer.
    async fn is_branch(&self, reference: &GitReference) -> Option<bool> {
        let url = self.repo_url(
            &reference.host,
            &reference.name,
            &["branches", &reference.git_ref],
        )?;
        self.ref_exists(url, "branch", reference).await
    }

    /// Whether the ref names a tag. `None` when the host could not answer.
    async fn is_tag(&self, reference: &GitReference) -> Option<bool> {
        // The git refs API takes the ref as a path, slashes included
        let mut segments = vec!["git", "ref", "tags"];
        segments.extend(reference.git_ref.split('/'));
        let url = self.repo_url(&reference.host, &reference.name, &segments)?;
        self.ref_exists(url, "tag", reference).await
    }

    async fn ref_exists(&self, url: Url, kind: &str, reference: &GitReference) -> Option<bool> {
        match self.status(url).await? {
            status if status.is_success() => Some(true),
            status if status == StatusCode::NOT_FOUND => Some(false),
            status => {
                tracing::warn!(
                    "Unexpected status {} checking {} {} of {}",
                    status,
                    kind,
                    reference.git_ref,
                    reference.name
                );
                None
            }
        }
    }

    /// Fetch one page of tags and the URL of the next page, if any
    async fn fetch_tags_page(&self, url: Url) -> anyhow::Result<(Vec<TagEntry>, Option<Url>)> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch tags from {}: {}", url, response.status());
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_url);

        Ok((response.json().await?, next))
    }

    /// Collect the version tags pointing at `sha`.
    ///
    /// Pages are followed until one contains a match, the listing ends, or
    /// [`MAX_TAG_PAGES`] pages have been read.
    async fn matching_tags(
        &self,
        reference: &GitReference,
        sha: &str,
    ) -> anyhow::Result<Vec<TagEntry>> {
        let mut url = self
            .repo_url(&reference.host, &reference.name, &["tags"])
            .ok_or_else(|| anyhow::anyhow!("invalid API base for {}", reference.host))?;
        url.query_pairs_mut().append_pair("per_page", "100");

        let mut matching = Vec::new();
        for _ in 0..MAX_TAG_PAGES {
            let (tags, next) = self.fetch_tags_page(url).await?;
            matching.extend(
                tags.into_iter()
                    .filter(|tag| tag.commit.sha.to_lowercase().starts_with(sha))
                    .filter(|tag| is_valid_version(&tag.name)),
            );

            match next {
                Some(next) if matching.is_empty() => url = next,
                _ => return Ok(matching),
            }
        }

        tracing::debug!(
            "No version tag for {} within {} pages of {}",
            sha,
            MAX_TAG_PAGES,
            reference.name
        );
        Ok(matching)
    }
}

/// Extract the `rel="next"` target from a `Link` header
fn next_page_url(header: &str) -> Option<Url> {
    header.split(',').find_map(|link| {
        let (target, params) = link.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| param.trim().eq_ignore_ascii_case("rel=\"next\""));
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

// API response structures
#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    commit: TagCommit,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    sha: String,
}

impl RepositoryClient for GitHubClient {
    async fn is_reachable(&self, name: &str, host: &str) -> bool {
        let key = (host.to_lowercase(), name.to_lowercase());
        if let Some(cached) = self.reachable.get(&key) {
            return *cached;
        }

        let reachable = match self.repo_url(host, name, &[]) {
            Some(url) => self.status(url).await.is_some_and(|s| s.is_success()),
            None => false,
        };
        tracing::debug!("{} on {} reachable: {}", name, host, reachable);

        self.reachable.insert(key, reachable);
        reachable
    }

    async fn is_pinned(&self, reference: &GitReference) -> bool {
        if is_full_commit_sha(&reference.git_ref) {
            return true;
        }

        // Tags are immutable by policy, even when a branch shares the name
        match self.is_tag(reference).await {
            Some(true) => return true,
            Some(false) => {}
            None => return false,
        }

        // Branches move, unless the branch itself is named like a version
        match self.is_branch(reference).await {
            Some(true) => is_valid_version(&reference.git_ref),
            Some(false) => true,
            None => false,
        }
    }

    async fn resolve_pinned_version(&self, reference: &GitReference) -> Option<String> {
        if !looks_like_commit_sha(&reference.git_ref) {
            return None;
        }

        let sha = reference.git_ref.to_lowercase();
        let tags = match self.matching_tags(reference, &sha).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        most_specific_version_tag(&tags, &sha)
    }
}

/// Pick the highest version tag pointing at `sha`, preferring `v3.0.0` over `v3`
fn most_specific_version_tag(tags: &[TagEntry], sha: &str) -> Option<String> {
    tags.iter()
        .filter(|tag| tag.commit.sha.to_lowercase().starts_with(sha))
        .filter(|tag| is_valid_version(&tag.name))
        .max_by(|a, b| {
            compare_versions(&a.name, &b.name)
                .then_with(|| a.name.split('.').count().cmp(&b.name.split('.').count()))
        })
        .map(|tag| tag.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::http_client::create_shared_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHA: &str = "8f4b7f84864484a7bf31766abe9204da3cbe65b3";

    fn client_for(server: &MockServer) -> GitHubClient {
        let source = SourceConfig {
            hostname: "github.com".to_string(),
            api_endpoint: Some(server.uri()),
        };
        GitHubClient::with_client(create_shared_client().unwrap(), source)
    }

    fn reference(git_ref: &str) -> GitReference {
        GitReference {
            name: "actions/checkout".to_string(),
            git_ref: git_ref.to_string(),
            host: "github.com".to_string(),
        }
    }

    fn tag(name: &str, sha: &str) -> TagEntry {
        TagEntry {
            name: name.to_string(),
            commit: TagCommit {
                sha: sha.to_string(),
            },
        }
    }

    #[test]
    fn test_repo_url_escapes_segments() {
        let github = GitHubClient::with_client(
            create_shared_client().unwrap(),
            SourceConfig::for_hostname("ghe.example.com"),
        );
        let url = github
            .repo_url("ghe.example.com", "octo/tools", &["branches", "releases/v1"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/tools/branches/releases%2Fv1"
        );
    }

    #[test]
    fn test_most_specific_version_tag() {
        let tags = vec![
            tag("v3", SHA),
            tag("v3.0.0", SHA),
            tag("latest", SHA),
            tag("v2.9.0", "0000000000000000000000000000000000000000"),
        ];
        assert_eq!(
            most_specific_version_tag(&tags, SHA),
            Some("v3.0.0".to_string())
        );
        assert_eq!(
            most_specific_version_tag(&tags, "8f4b7f8"),
            Some("v3.0.0".to_string())
        );
        assert_eq!(most_specific_version_tag(&tags, "1234567"), None);
    }

    #[tokio::test]
    async fn test_is_reachable_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(github.is_reachable("actions/checkout", "github.com").await);
        assert!(github.is_reachable("actions/checkout", "github.com").await);
    }

    #[tokio::test]
    async fn test_missing_repository_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/nobody/nothing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(!github.is_reachable("nobody/nothing", "github.com").await);
    }

    #[tokio::test]
    async fn test_full_sha_is_pinned_without_request() {
        let server = MockServer::start().await;
        let github = client_for(&server);
        assert!(github.is_pinned(&reference(SHA)).await);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_branch_is_not_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/branches/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(!github.is_pinned(&reference("main")).await);
    }

    #[tokio::test]
    async fn test_version_branch_is_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/branches/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(github.is_pinned(&reference("v1")).await);
    }

    #[tokio::test]
    async fn test_tag_is_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/git/ref/tags/stable"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;
        // A branch with the same name does not make the tag float
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/branches/stable"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(github.is_pinned(&reference("stable")).await);
    }

    #[tokio::test]
    async fn test_nested_tag_name_keeps_slashes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/git/ref/tags/releases/stable"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(github.is_pinned(&reference("releases/stable")).await);
    }

    #[tokio::test]
    async fn test_unknown_ref_is_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/branches/abc1234"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(github.is_pinned(&reference("abc1234")).await);
    }

    #[tokio::test]
    async fn test_tag_lookup_error_is_not_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/git/ref/tags/stable"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(!github.is_pinned(&reference("stable")).await);
    }

    #[tokio::test]
    async fn test_server_error_is_not_pinned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/branches/stable"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert!(!github.is_pinned(&reference("stable")).await);
    }

    #[tokio::test]
    async fn test_resolve_pinned_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/tags"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "v3", "commit": { "sha": SHA } },
                { "name": "v3.0.0", "commit": { "sha": SHA } },
                { "name": "v2.4.0", "commit": { "sha": "1111111111111111111111111111111111111111" } }
            ])))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert_eq!(
            github.resolve_pinned_version(&reference(SHA)).await,
            Some("v3.0.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_follows_next_page() {
        let server = MockServer::start().await;
        let other = "1111111111111111111111111111111111111111";
        let first_page: Vec<serde_json::Value> = (0..100)
            .map(|i| serde_json::json!({ "name": format!("v9.{i}.0"), "commit": { "sha": other } }))
            .collect();
        let link = format!(
            "<{0}/repos/actions/checkout/tags?per_page=100&page=2>; rel=\"next\", \
             <{0}/repos/actions/checkout/tags?per_page=100&page=2>; rel=\"last\"",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/tags"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "v2.1.0", "commit": { "sha": SHA } },
                { "name": "v2.0.0", "commit": { "sha": other } }
            ])))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", link.as_str())
                    .set_body_json(first_page),
            )
            .expect(1)
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert_eq!(
            github.resolve_pinned_version(&reference(SHA)).await,
            Some("v2.1.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_stops_after_page_limit() {
        let server = MockServer::start().await;
        let link = format!(
            "<{}/repos/actions/checkout/tags?per_page=100&page=2>; rel=\"next\"",
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", link.as_str())
                    .set_body_json(serde_json::json!([
                        { "name": "v1.0.0", "commit": { "sha": "1111111111111111111111111111111111111111" } }
                    ])),
            )
            .expect(MAX_TAG_PAGES as u64)
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert_eq!(github.resolve_pinned_version(&reference(SHA)).await, None);
    }

    #[test]
    fn test_next_page_url() {
        let header = r#"<https://api.github.com/repositories/1/tags?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/tags?per_page=100&page=7>; rel="last""#;
        assert_eq!(
            next_page_url(header).unwrap().as_str(),
            "https://api.github.com/repositories/1/tags?per_page=100&page=2"
        );

        let last_page = r#"<https://api.github.com/repositories/1/tags?page=1>; rel="first", <https://api.github.com/repositories/1/tags?page=6>; rel="prev""#;
        assert_eq!(next_page_url(last_page), None);
        assert_eq!(next_page_url(""), None);
        assert_eq!(next_page_url("<not a url>; rel=\"next\""), None);
    }

    #[tokio::test]
    async fn test_resolve_skips_non_sha_refs() {
        let server = MockServer::start().await;
        let github = client_for(&server);
        assert_eq!(github.resolve_pinned_version(&reference("main")).await, None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/actions/checkout/tags"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let github = client_for(&server);
        assert_eq!(github.resolve_pinned_version(&reference(SHA)).await, None);
    }
}
