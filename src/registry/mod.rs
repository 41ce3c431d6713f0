//! Remote sources of manifests, versions and tags
//!
//! - [`npm`]: package.json and version resolution over npm CDNs
//! - [`github`]: tag listing of GitHub repositories

#[cfg(test)]
use mockall::automock;

use crate::error::RegistryError;
use crate::repo::manifest::Manifest;

pub mod github;
pub mod npm;

pub use github::GitHubRegistry;
pub use npm::CdnRegistry;

/// Trait for fetching package metadata from the npm ecosystem
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Fetches the package.json of the latest published version
    ///
    /// # Returns
    /// * `Ok(Manifest)` - The manifest from the first source that answered
    /// * `Err(RegistryError)` - The failure of the last source tried
    async fn fetch_manifest(&self, package_name: &str) -> Result<Manifest, RegistryError>;

    /// Resolves a version specifier (`latest`, `^1.2.0`, `1.x`) to a
    /// published version
    ///
    /// # Returns
    /// * `Ok(Some(version))` - The resolved version
    /// * `Ok(None)` - No published version satisfies the specifier
    /// * `Err(RegistryError)` - If the fetch fails
    async fn resolve_version(
        &self,
        package_name: &str,
        spec: &str,
    ) -> Result<Option<String>, RegistryError>;
}

/// Trait for listing the tags of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagRegistry: Send + Sync {
    /// Fetches all tag names of `repo` (`owner/name`) in the order the
    /// server lists them.
    ///
    /// Returns an empty list if the repository id is malformed, the
    /// repository has no tags, or every source fails.
    async fn fetch_tags(&self, repo: &str) -> Vec<String>;
}
