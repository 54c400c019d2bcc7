//! Dependency report generation
//!
//! This module renders a parse result as JSON, Markdown or a plain summary.

use serde::Serialize;

use crate::parsers::{Dependency, Ecosystem};

/// Everything a scan produced
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport<'a> {
    pub ecosystem: &'a Ecosystem,
    pub dependencies: &'a [Dependency],
}

impl<'a> ScanReport<'a> {
    pub fn new(ecosystem: &'a Ecosystem, dependencies: &'a [Dependency]) -> Self {
        Self {
            ecosystem,
            dependencies,
        }
    }
}

pub fn generate_json_report(report: &ScanReport<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn generate_markdown_report(report: &ScanReport<'_>) -> String {
    let mut lines = vec![
        "# Action Dependencies".to_string(),
        String::new(),
        format!("**Date**: {}", chrono::Local::now().format("%Y-%m-%d")),
        format!(
            "**Representative action**: {}@{}",
            report.ecosystem.package_manager.name, report.ecosystem.package_manager.version
        ),
        String::new(),
    ];

    if report.dependencies.is_empty() {
        lines.push("No action dependencies found.".to_string());
        return lines.join("\n");
    }

    lines.push("| Action | Version | Ref | File |".to_string());
    lines.push("|--------|---------|-----|------|".to_string());
    for dep in report.dependencies {
        let version = dep.version.as_deref().unwrap_or("-");
        for requirement in &dep.requirements {
            lines.push(format!(
                "| {} | {} | `{}` | {} |",
                dep.name, version, requirement.source.git_ref, requirement.file
            ));
        }
    }

    lines.join("\n")
}

/// One line per dependency: `name version (ref) [files]`
pub fn generate_summary(report: &ScanReport<'_>) -> String {
    report
        .dependencies
        .iter()
        .map(|dep| {
            let refs: Vec<&str> = dep
                .requirements
                .iter()
                .map(|r| r.source.git_ref.as_str())
                .collect();
            let files: Vec<&str> = dep.requirements.iter().map(|r| r.file.as_str()).collect();
            format!(
                "{} {} ({}) [{}]",
                dep.name,
                dep.version.as_deref().unwrap_or("unversioned"),
                refs.join(", "),
                files.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
