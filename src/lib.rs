//! actions-deps - GitHub Actions dependency extraction
//!
//! This crate finds the actions referenced by workflow files and composite
//! actions and turns them into dependency records for update tooling.

pub mod config;
pub mod document;
pub mod error;
pub mod file_types;
pub mod parsers;
pub mod registries;
pub mod reports;
