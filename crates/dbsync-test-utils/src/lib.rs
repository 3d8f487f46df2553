//! Shared test utilities for the dbsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`], a temporary `.sqlproj` project
//! - [`snapshot`]: [`SnapshotBuilder`] for catalog snapshot documents

pub mod project;
pub mod snapshot;

pub use project::TestProject;
pub use snapshot::SnapshotBuilder;
