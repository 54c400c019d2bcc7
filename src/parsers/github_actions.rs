//! Dependency parser for GitHub Actions manifests
//!
//! Turns the `uses` declarations of workflow files and composite actions
//! into [`Dependency`] records:
//!
//! 1. each manifest is parsed into a [`Node`](crate::document::Node) tree and
//!    its raw references are extracted
//! 2. references are classified; local and container actions are skipped
//! 3. a dependency is built for the source host, falling back to github.com
//!    when an Enterprise host does not serve the action
//! 4. refs that are not versions must be pinned to be tracked, and pinned
//!    commits pick up the version of a matching tag when one exists
//!
//! Files are processed one at a time in the order given. A manifest that
//! cannot be parsed aborts the whole run.

use std::sync::OnceLock;

use crate::config::{PUBLIC_HOSTNAME, SourceConfig};
use crate::document::parse_document;
use crate::error::{Error, Result};
use crate::registries::version_utils::normalize_version;
use crate::registries::{GitReference, RepositoryClient};

use super::extractor::references_in_manifest;
use super::reference::{ActionReference, ParsedReference, classify_reference, match_reference};
use super::{
    Dependency, DependencySet, Ecosystem, GitSource, ManifestFile, PACKAGE_MANAGER,
    PackageManagerVersion, Requirement, RequirementMetadata,
};

/// Placeholder descriptor used when no manifest references any action
const UNKNOWN_PACKAGE_MANAGER: &str = "unknown";
const UNKNOWN_PACKAGE_MANAGER_VERSION: &str = "0.0.0";

/// Parser for a batch of GitHub Actions manifests
pub struct WorkflowParser<C> {
    files: Vec<ManifestFile>,
    client: C,
    source: SourceConfig,
    ecosystem: OnceLock<Ecosystem>,
}

impl<C: RepositoryClient> WorkflowParser<C> {
    /// Create a parser over `files`.
    ///
    /// Fails with [`Error::NoManifests`] when `files` is empty.
    pub fn new(files: Vec<ManifestFile>, client: C, source: SourceConfig) -> Result<Self> {
        if files.is_empty() {
            return Err(Error::NoManifests);
        }

        Ok(Self {
            files,
            client,
            source,
            ecosystem: OnceLock::new(),
        })
    }

    pub fn files(&self) -> &[ManifestFile] {
        &self.files
    }

    /// Parse every manifest and merge the results by dependency name
    pub async fn parse(&self) -> Result<Vec<Dependency>> {
        let mut dependencies = DependencySet::new();

        for file in &self.files {
            let file_dependencies = self.workflow_file_dependencies(file).await?;
            dependencies.extend(file_dependencies);
        }

        tracing::info!(
            "Found {} action dependencies in {} manifests",
            dependencies.len(),
            self.files.len()
        );

        Ok(dependencies.into_vec())
    }

    /// Ecosystem descriptor, computed on first access and cached
    pub fn ecosystem(&self) -> &Ecosystem {
        self.ecosystem.get_or_init(|| Ecosystem {
            name: PACKAGE_MANAGER.to_string(),
            package_manager: representative_version(&self.files),
        })
    }

    async fn workflow_file_dependencies(&self, file: &ManifestFile) -> Result<DependencySet> {
        let document =
            parse_document(&file.content).map_err(|source| Error::ManifestNotParseable {
                path: file.name.clone(),
                source,
            })?;

        let mut dependencies = DependencySet::new();

        for raw in references_in_manifest(&document) {
            let parsed = match classify_reference(&raw) {
                Some(ActionReference::Repository(parsed)) => parsed,
                Some(ActionReference::LocalPath | ActionReference::DockerImage) => {
                    tracing::debug!("Skipping untracked action {} in {}", raw, file.name);
                    continue;
                }
                None => {
                    tracing::debug!("Ignoring unrecognized reference {} in {}", raw, file.name);
                    continue;
                }
            };

            let dependency = self.build_github_dependency(&file.name, &raw, &parsed).await;
            if let Some(dependency) = self.resolve_version(dependency).await {
                dependencies.insert(dependency);
            }
        }

        if dependencies.is_empty() {
            tracing::debug!("No tracked actions in {}", file.name);
        }

        Ok(dependencies)
    }

    /// Build against the source host when it serves the action, else against github.com
    async fn build_github_dependency(
        &self,
        file_name: &str,
        raw: &str,
        parsed: &ParsedReference,
    ) -> Dependency {
        if !self.source.is_public() {
            let name = parsed.name();
            if self.client.is_reachable(&name, &self.source.hostname).await {
                return github_dependency(file_name, raw, parsed, &self.source.hostname);
            }
            tracing::debug!(
                "{} not found on {}, assuming {}",
                name,
                self.source.hostname,
                PUBLIC_HOSTNAME
            );
        }

        github_dependency(file_name, raw, parsed, PUBLIC_HOSTNAME)
    }

    /// Reconcile a dependency without a derived version against its repository.
    ///
    /// Returns `None` when the dependency floats on a branch and should not be
    /// tracked. Unreachable repositories keep the manifest-derived fields.
    async fn resolve_version(&self, dependency: Dependency) -> Option<Dependency> {
        if dependency.version.is_some() {
            return Some(dependency);
        }
        let Some(reference) = git_reference(&dependency) else {
            return Some(dependency);
        };

        if !self
            .client
            .is_reachable(&reference.name, &reference.host)
            .await
        {
            return Some(dependency);
        }

        if !self.client.is_pinned(&reference).await {
            tracing::debug!(
                "Skipping {}@{}: ref is not pinned",
                reference.name,
                reference.git_ref
            );
            return None;
        }

        let resolved = self
            .client
            .resolve_pinned_version(&reference)
            .await
            .and_then(|tag| normalize_version(&tag));

        match resolved {
            Some(version) => Some(Dependency {
                version: Some(version),
                ..dependency
            }),
            None => Some(dependency),
        }
    }
}

/// Build the dependency for one matched reference on `hostname`
pub fn github_dependency(
    file_name: &str,
    raw: &str,
    parsed: &ParsedReference,
    hostname: &str,
) -> Dependency {
    let name = parsed.name();
    let url = format!("https://{hostname}/{name}").to_lowercase();

    Dependency {
        version: normalize_version(&parsed.git_ref),
        requirements: vec![Requirement {
            requirement: None,
            groups: Vec::new(),
            source: GitSource {
                kind: "git".to_string(),
                url,
                git_ref: parsed.git_ref.clone(),
                branch: None,
            },
            file: file_name.to_string(),
            metadata: RequirementMetadata {
                declaration_string: raw.to_string(),
            },
        }],
        package_manager: PACKAGE_MANAGER.to_string(),
        name,
    }
}

/// Repository coordinates of a dependency's first declaration
fn git_reference(dependency: &Dependency) -> Option<GitReference> {
    let source = dependency.source()?;
    Some(GitReference {
        name: dependency.name.clone(),
        git_ref: source.git_ref.clone(),
        host: source.host()?.to_string(),
    })
}

/// First grammatical reference across all manifests, as a package manager descriptor.
///
/// Files are scanned in order and each file's references in discovery
/// order. Unparseable files are skipped; the dependency pass reports them.
/// The ref is reported as declared, not normalized.
pub fn representative_version(files: &[ManifestFile]) -> PackageManagerVersion {
    files
        .iter()
        .filter_map(|file| match parse_document(&file.content) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::debug!("Skipping {} for ecosystem detection: {}", file.name, e);
                None
            }
        })
        .flat_map(|document| references_in_manifest(&document))
        .find_map(|raw| match_reference(&raw))
        .map(|parsed| PackageManagerVersion {
            name: parsed.name(),
            version: parsed.git_ref,
        })
        .unwrap_or_else(|| PackageManagerVersion {
            name: UNKNOWN_PACKAGE_MANAGER.to_string(),
            version: UNKNOWN_PACKAGE_MANAGER_VERSION.to_string(),
        })
}
