//! Parsers for GitHub Actions manifests (workflows and composite actions)

use serde::{Deserialize, Serialize};

/// Package manager identifier attached to every dependency
pub const PACKAGE_MANAGER: &str = "github_actions";

/// A manifest file that has already been fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    /// Path of the file within the repository, e.g. `.github/workflows/ci.yml`
    pub name: String,
    /// Raw file content
    pub content: String,
}

impl ManifestFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Represents an action dependency extracted from a manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Repository in `owner/repo` form (never includes a sub-directory path)
    pub name: String,
    /// Normalized version, present only when the ref is (or resolves to) a version
    pub version: Option<String>,
    /// Every place this action was declared
    pub requirements: Vec<Requirement>,
    pub package_manager: String,
}

/// One declaration of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Version range. Always empty: actions have no range syntax.
    pub requirement: Option<String>,
    pub groups: Vec<String>,
    pub source: GitSource,
    /// Manifest the declaration came from
    pub file: String,
    pub metadata: RequirementMetadata,
}

/// Git coordinates of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// Always `git`
    #[serde(rename = "type")]
    pub kind: String,
    /// Lower-cased `https://<host>/<owner>/<repo>`
    pub url: String,
    /// The ref exactly as declared
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementMetadata {
    /// The original `uses` string
    pub declaration_string: String,
}

impl GitSource {
    /// Hostname part of the source URL
    pub fn host(&self) -> Option<&str> {
        self.url
            .strip_prefix("https://")
            .and_then(|rest| rest.split('/').next())
    }
}

impl Dependency {
    /// The first declaration's git source
    pub fn source(&self) -> Option<&GitSource> {
        self.requirements.first().map(|r| &r.source)
    }
}

/// Ordered collection of dependencies keyed by name.
///
/// Adding a dependency whose name is already present merges the new
/// declarations into the existing entry instead of duplicating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    dependencies: Vec<Dependency>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge a dependency.
    ///
    /// On a name collision the version of the first declaration wins, so
    /// file and declaration order decide which version is reported when two
    /// declarations disagree. An absent version is filled from the newcomer.
    /// Requirements are appended unless an equal one is already recorded.
    pub fn insert(&mut self, dependency: Dependency) {
        let Some(existing) = self
            .dependencies
            .iter_mut()
            .find(|d| d.name == dependency.name)
        else {
            self.dependencies.push(dependency);
            return;
        };

        if existing.version.is_none() {
            existing.version = dependency.version;
        }
        for requirement in dependency.requirements {
            if !existing.requirements.contains(&requirement) {
                existing.requirements.push(requirement);
            }
        }
    }

    pub fn extend(&mut self, other: DependencySet) {
        for dependency in other.dependencies {
            self.insert(dependency);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn into_vec(self) -> Vec<Dependency> {
        self.dependencies
    }
}

/// Heuristic package manager descriptor used for ecosystem reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerVersion {
    pub name: String,
    pub version: String,
}

/// Ecosystem summary for a set of manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ecosystem {
    pub name: String,
    pub package_manager: PackageManagerVersion,
}

pub mod extractor;
pub mod github_actions;
pub mod reference;
