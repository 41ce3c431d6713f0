//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use npm_repo::cache::Cache;
use npm_repo::config::DEFAULT_CACHE_TTL_MS;
use npm_repo::error::RegistryError;
use npm_repo::lookup::PackageLookup;
use npm_repo::registry::{PackageRegistry, TagRegistry};
use npm_repo::repo::manifest::{Manifest, RepositoryField};

/// Mock package registry serving fixed manifests and resolutions
#[derive(Default)]
pub struct MockRegistry {
    manifests: HashMap<String, Manifest>,
    resolutions: HashMap<(String, String), String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, package: &str, manifest: Manifest) -> Self {
        self.manifests.insert(package.to_string(), manifest);
        self
    }

    pub fn with_resolution(mut self, package: &str, spec: &str, version: &str) -> Self {
        self.resolutions.insert(
            (package.to_string(), spec.to_string()),
            version.to_string(),
        );
        self
    }
}

#[async_trait]
impl PackageRegistry for MockRegistry {
    async fn fetch_manifest(&self, package_name: &str) -> Result<Manifest, RegistryError> {
        self.manifests
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }

    async fn resolve_version(
        &self,
        package_name: &str,
        spec: &str,
    ) -> Result<Option<String>, RegistryError> {
        if !self.manifests.contains_key(package_name) {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }
        Ok(self
            .resolutions
            .get(&(package_name.to_string(), spec.to_string()))
            .cloned())
    }
}

/// Mock tag registry serving fixed tag lists
#[derive(Default)]
pub struct MockTags {
    tags: HashMap<String, Vec<String>>,
}

impl MockTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, repo: &str, tags: Vec<&str>) -> Self {
        self.tags.insert(
            repo.to_string(),
            tags.into_iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl TagRegistry for MockTags {
    async fn fetch_tags(&self, repo: &str) -> Vec<String> {
        self.tags.get(repo).cloned().unwrap_or_default()
    }
}

/// Manifest declaring a repository as a plain URL string
pub fn manifest(name: &str, version: &str, repository: &str) -> Manifest {
    Manifest::new(version)
        .with_name(name)
        .with_repository(RepositoryField::Url(repository.to_string()))
}

/// Manifest declaring a repository folder of a monorepo
pub fn monorepo_manifest(name: &str, version: &str, url: &str, directory: &str) -> Manifest {
    Manifest::new(version)
        .with_name(name)
        .with_repository(RepositoryField::Detailed {
            url: Some(url.to_string()),
            directory: Some(directory.to_string()),
        })
}

pub fn create_test_lookup(registry: MockRegistry, tags: MockTags) -> PackageLookup {
    PackageLookup::new(Arc::new(registry), Arc::new(tags))
}

/// Create a test cache with pre-populated lookups
pub fn create_test_cache(packages: &[(&str, Manifest, Vec<&str>)]) -> (TempDir, Arc<Cache>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let cache = Cache::new(&db_path, DEFAULT_CACHE_TTL_MS).unwrap();

    for (package_name, manifest, tags) in packages {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        cache.put(package_name, manifest, &tags).unwrap();
    }

    (temp_dir, Arc::new(cache))
}
