//! Manifest kind detection
//!
//! Decides whether a path names a workflow file or a composite action
//! metadata file. Used to pre-filter files before parsing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::parsers::ManifestFile;

/// Supported manifest kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// A workflow under `.github/workflows/`
    Workflow,
    /// Action metadata (`action.yml` / `action.yaml`), usually a composite action
    Action,
}

impl ManifestKind {
    /// Detect the manifest kind from a path.
    ///
    /// Returns `None` if the path is not a recognized manifest.
    pub fn detect(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;

        if file_name == "action.yml" || file_name == "action.yaml" {
            return Some(ManifestKind::Action);
        }

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        let in_workflows_dir = path
            .parent()
            .is_some_and(|dir| dir.ends_with(Path::new(".github").join("workflows")));

        if is_yaml && in_workflows_dir {
            Some(ManifestKind::Workflow)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestKind::Workflow => "workflow",
            ManifestKind::Action => "action",
        }
    }
}

/// Load manifests from a list of paths.
///
/// Directories are walked and only recognized manifests are kept, in path
/// order. Files named explicitly are loaded whatever their name. Manifest
/// names are the paths as given, with `/` separators.
pub fn collect_manifests(paths: &[PathBuf]) -> anyhow::Result<Vec<ManifestFile>> {
    let mut manifests = Vec::new();

    for path in paths {
        if path.is_dir() {
            let entries = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.file_name() != ".git");
            for entry in entries {
                let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(kind) = ManifestKind::detect(entry.path()) {
                    tracing::debug!("Found {} manifest {}", kind.as_str(), entry.path().display());
                    manifests.push(load_manifest(entry.path())?);
                }
            }
        } else {
            manifests.push(load_manifest(path)?);
        }
    }

    Ok(manifests)
}

fn load_manifest(path: &Path) -> anyhow::Result<ManifestFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.to_string_lossy().replace('\\', "/");
    Ok(ManifestFile::new(name, content))
}
