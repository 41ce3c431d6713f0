//! Version handling for release tags
//!
//! # Modules
//!
//! - [`semver`]: Locates loose semantic versions inside strings
//! - [`pattern`]: `TagPattern` and inference of a repository's tag convention
//! - [`ranker`]: Extracts versions from tags and orders them newest first

pub mod pattern;
pub mod ranker;
pub mod semver;
