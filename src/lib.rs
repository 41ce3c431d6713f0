//! Resolve npm packages to browsable GitHub URLs at released versions.
//!
//! A lookup fetches the package manifest, normalizes its `repository`
//! field to a GitHub repository, lists the repository's tags and infers how
//! versions map to tag names, so that `vite@5.0.0` becomes
//! `https://github.com/vitejs/vite/tree/v5.0.0/packages/vite`.
//!
//! # Modules
//!
//! - [`version`]: Version matching, tag pattern inference and ranking
//! - [`repo`]: Manifest repository normalization, `RepoRef` parsing, URL building
//! - [`registry`]: Manifest, version and tag sources
//! - [`cache`]: SQLite cache of lookup results
//! - [`lookup`]: Coordinates a lookup across cache and registries
//! - [`config`]: Configuration file and paths
//! - [`error`]: Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod repo;
pub mod version;
