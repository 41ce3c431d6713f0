//! Repository discovery and URL composition
//!
//! # Modules
//!
//! - [`manifest`]: package.json manifest and repository field normalization
//! - [`hosted`]: Recognition of hosted git URL shapes (ssh, git, shorthand)
//! - [`url`]: `RepoRef` and parsing of GitHub repository URLs
//! - [`builder`]: Browse, compare and listing URLs for released versions

pub mod builder;
pub mod hosted;
pub mod manifest;
pub mod url;
