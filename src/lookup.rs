//! Package lookup coordinator
//!
//! Drives one lookup from package name to repository, tags and tag pattern:
//!
//! ```text
//! cache ──hit──────────────────────────────┐
//!   │ miss                                  ▼
//! manifest ─▶ repository URL ─▶ RepoRef ─▶ tags ─▶ pattern
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{Cache, CachedPackage};
use crate::error::{LookupError, RegistryError};
use crate::registry::{PackageRegistry, TagRegistry};
use crate::repo::builder::{CompareRange, RepoUrlBuilder};
use crate::repo::manifest::Manifest;
use crate::repo::url::{RepoRef, parse_repo};
use crate::version::pattern::{TagPattern, infer_tag_pattern};
use crate::version::{ranker, semver};

/// Version specifier meaning "the version in the manifest"
pub const LATEST: &str = "latest";

/// Everything known about a package after a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    pub name: String,
    pub manifest: Manifest,
    pub repo: RepoRef,
    pub tags: Vec<String>,
    pub pattern: TagPattern,
}

impl ResolvedPackage {
    pub fn urls(&self) -> RepoUrlBuilder<'_> {
        RepoUrlBuilder::new(&self.repo, &self.pattern)
    }

    /// Browse URL of the repository at the manifest's version
    pub fn browse_url(&self) -> String {
        self.urls().tree_url(&self.manifest.version)
    }

    /// The `limit` highest versions tagged with the package's pattern
    pub fn recent_versions(&self, limit: usize) -> Vec<String> {
        ranker::rank_versions(&self.tags, &self.pattern, limit)
    }

    /// `{version}  {url}` lines for the `limit` highest versions
    pub fn listing(&self, limit: usize) -> Vec<String> {
        self.urls().listing(&self.recent_versions(limit))
    }
}

/// Resolves packages through the registries, consulting the cache first
pub struct PackageLookup {
    packages: Arc<dyn PackageRegistry>,
    tags: Arc<dyn TagRegistry>,
    cache: Option<Arc<Cache>>,
}

impl PackageLookup {
    pub fn new(packages: Arc<dyn PackageRegistry>, tags: Arc<dyn TagRegistry>) -> Self {
        Self {
            packages,
            tags,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Look up a package and infer how its repository tags releases.
    pub async fn resolve(&self, package_name: &str) -> Result<ResolvedPackage, LookupError> {
        let (manifest, tags) = match self.cached(package_name) {
            Some(CachedPackage { manifest, tags }) => (manifest, tags),
            None => self.fetch(package_name).await?,
        };

        let repo = repository_of(package_name, &manifest)?;
        let hints = tag_hints(package_name, &manifest, &repo);
        let pattern = infer_tag_pattern(&tags, &hints);
        debug!(
            "Inferred tag pattern {} for {} from {} tags",
            pattern,
            package_name,
            tags.len()
        );

        Ok(ResolvedPackage {
            name: package_name.to_string(),
            manifest,
            repo,
            tags,
            pattern,
        })
    }

    /// GitHub compare URL for a range such as `4.0.0...5.0.0`, `^4..latest`
    /// or a single `4.0.0` (compared to the manifest's version).
    pub async fn compare_url(
        &self,
        package: &ResolvedPackage,
        range: &str,
    ) -> Result<String, LookupError> {
        let mode = CompareRange::detect(range);
        let mut sides: Vec<&str> = range.split(mode.separator()).collect();
        if sides.len() == 1 {
            sides.push(LATEST);
        }
        let [from, to] = sides.as_slice() else {
            return Err(LookupError::InvalidCompareRange(range.to_string()));
        };

        let (from, to) = futures::try_join!(
            self.resolve_spec(package, from),
            self.resolve_spec(package, to)
        )?;

        Ok(package.urls().compare_url(&from, &to, mode))
    }

    /// Turn one side of a compare range into a concrete version.
    async fn resolve_spec(
        &self,
        package: &ResolvedPackage,
        spec: &str,
    ) -> Result<String, LookupError> {
        let spec = spec.trim();
        if spec.is_empty() || spec == LATEST {
            return Ok(package.manifest.version.clone());
        }
        if semver::is_exact(spec) {
            return Ok(spec.to_string());
        }

        match self.packages.resolve_version(&package.name, spec).await {
            Ok(Some(version)) => Ok(version),
            Ok(None) | Err(RegistryError::NotFound(_)) => Err(LookupError::UnresolvedVersion {
                package: package.name.clone(),
                spec: spec.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch(&self, package_name: &str) -> Result<(Manifest, Vec<String>), LookupError> {
        let manifest = match self.packages.fetch_manifest(package_name).await {
            Ok(manifest) => manifest,
            Err(RegistryError::NotFound(_)) => {
                return Err(LookupError::PackageNotFound(package_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let repo = repository_of(package_name, &manifest)?;
        let tags = self.tags.fetch_tags(repo.repo()).await;
        if tags.is_empty() {
            return Err(LookupError::NoTags(package_name.to_string()));
        }
        info!("Fetched {} tags of {} for {}", tags.len(), repo.repo(), package_name);

        self.store(package_name, &manifest, &tags);
        Ok((manifest, tags))
    }

    fn cached(&self, package_name: &str) -> Option<CachedPackage> {
        let cache = self.cache.as_ref()?;
        cache
            .get(package_name)
            .inspect_err(|e| warn!("Failed to read cache for {}: {}", package_name, e))
            .ok()
            .flatten()
    }

    fn store(&self, package_name: &str, manifest: &Manifest, tags: &[String]) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(package_name, manifest, tags)
        {
            warn!("Failed to cache {}: {}", package_name, e);
        }
    }
}

/// The GitHub repository a manifest declares
fn repository_of(package_name: &str, manifest: &Manifest) -> Result<RepoRef, LookupError> {
    let url = manifest
        .repository_url()
        .ok_or_else(|| LookupError::RepositoryNotDeclared(package_name.to_string()))?;
    parse_repo(&url)?.ok_or(LookupError::UnsupportedRepository(url))
}

/// Strings expected to appear in the package's release tags
fn tag_hints(package_name: &str, manifest: &Manifest, repo: &RepoRef) -> Vec<String> {
    let mut hints = vec![
        manifest.version.clone(),
        format!("{}@{}", package_name, manifest.version),
    ];
    if !repo.folder().is_empty() {
        hints.push(repo.folder().to_string());
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CACHE_TTL_MS;
    use crate::registry::{MockPackageRegistry, MockTagRegistry};
    use crate::repo::manifest::RepositoryField;
    use tempfile::TempDir;

    fn vite_manifest() -> Manifest {
        Manifest::new("5.0.0")
            .with_name("vite")
            .with_repository(RepositoryField::Detailed {
                url: Some("git+https://github.com/vitejs/vite.git".to_string()),
                directory: Some("packages/vite".to_string()),
            })
    }

    fn vite_tags() -> Vec<String> {
        ["v4.0.0", "v5.0.0", "plugin-legacy@5.0.0"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn create_test_cache() -> (TempDir, Arc<Cache>) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let cache = Cache::new(&db_path, DEFAULT_CACHE_TTL_MS).unwrap();
        (temp_dir, Arc::new(cache))
    }

    fn lookup(packages: MockPackageRegistry, tags: MockTagRegistry) -> PackageLookup {
        PackageLookup::new(Arc::new(packages), Arc::new(tags))
    }

    fn resolved_vite() -> ResolvedPackage {
        ResolvedPackage {
            name: "vite".to_string(),
            manifest: vite_manifest(),
            repo: RepoRef::new("vitejs/vite", "packages/vite").unwrap(),
            tags: vite_tags(),
            pattern: TagPattern::default(),
        }
    }

    #[tokio::test]
    async fn resolve_fetches_manifest_and_tags() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .withf(|name| name == "vite")
            .times(1)
            .returning(|_| Ok(vite_manifest()));
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags()
            .withf(|repo| repo == "vitejs/vite")
            .times(1)
            .returning(|_| vite_tags());

        let resolved = lookup(packages, tags).resolve("vite").await.unwrap();

        assert_eq!(resolved, resolved_vite());
        assert_eq!(
            resolved.browse_url(),
            "https://github.com/vitejs/vite/tree/v5.0.0/packages/vite"
        );
    }

    #[tokio::test]
    async fn resolve_uses_fresh_cache_entry_without_fetching() {
        let (_temp_dir, cache) = create_test_cache();
        cache.put("vite", &vite_manifest(), &vite_tags()).unwrap();

        let mut packages = MockPackageRegistry::new();
        packages.expect_fetch_manifest().times(0);
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().times(0);

        let resolved = lookup(packages, tags)
            .with_cache(cache)
            .resolve("vite")
            .await
            .unwrap();

        assert_eq!(resolved, resolved_vite());
    }

    #[tokio::test]
    async fn resolve_stores_fetched_result_in_cache() {
        let (_temp_dir, cache) = create_test_cache();

        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .returning(|_| Ok(vite_manifest()));
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().returning(|_| vite_tags());

        lookup(packages, tags)
            .with_cache(cache.clone())
            .resolve("vite")
            .await
            .unwrap();

        let cached = cache.get("vite").unwrap().unwrap();
        assert_eq!(cached.manifest, vite_manifest());
        assert_eq!(cached.tags, vite_tags());
    }

    #[tokio::test]
    async fn resolve_reports_missing_package() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .returning(|name| Err(RegistryError::NotFound(name.to_string())));
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().times(0);

        let result = lookup(packages, tags).resolve("nonexistent-package").await;

        assert!(matches!(result, Err(LookupError::PackageNotFound(name)) if name == "nonexistent-package"));
    }

    #[tokio::test]
    async fn resolve_propagates_other_registry_errors() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .returning(|_| Err(RegistryError::InvalidResponse("Unexpected status: 500".to_string())));

        let result = lookup(packages, MockTagRegistry::new()).resolve("vite").await;

        assert!(matches!(
            result,
            Err(LookupError::Registry(RegistryError::InvalidResponse(_)))
        ));
    }

    #[tokio::test]
    async fn resolve_reports_manifest_without_repository() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .returning(|_| Ok(Manifest::new("1.3.0").with_name("left-pad")));
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().times(0);

        let result = lookup(packages, tags).resolve("left-pad").await;

        assert!(matches!(result, Err(LookupError::RepositoryNotDeclared(_))));
    }

    #[tokio::test]
    async fn resolve_reports_repository_off_github() {
        let mut packages = MockPackageRegistry::new();
        packages.expect_fetch_manifest().returning(|_| {
            Ok(Manifest::new("1.0.0").with_repository(RepositoryField::Url(
                "gitlab:group/project".to_string(),
            )))
        });
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().times(0);

        let result = lookup(packages, tags).resolve("project").await;

        assert!(matches!(
            result,
            Err(LookupError::UnsupportedRepository(url)) if url == "https://gitlab.com/group/project"
        ));
    }

    #[tokio::test]
    async fn resolve_reports_repository_without_tags_and_skips_cache() {
        let (_temp_dir, cache) = create_test_cache();

        let mut packages = MockPackageRegistry::new();
        packages
            .expect_fetch_manifest()
            .returning(|_| Ok(vite_manifest()));
        let mut tags = MockTagRegistry::new();
        tags.expect_fetch_tags().returning(|_| Vec::new());

        let result = lookup(packages, tags)
            .with_cache(cache.clone())
            .resolve("vite")
            .await;

        assert!(matches!(result, Err(LookupError::NoTags(_))));
        assert_eq!(cache.get("vite").unwrap(), None);
    }

    #[test]
    fn tag_hints_include_folder_only_when_present() {
        let manifest = vite_manifest();

        let root = RepoRef::new("vitejs/vite", "").unwrap();
        assert_eq!(tag_hints("vite", &manifest, &root), vec!["5.0.0", "vite@5.0.0"]);

        let nested = RepoRef::new("vitejs/vite", "packages/vite").unwrap();
        assert_eq!(
            tag_hints("vite", &manifest, &nested),
            vec!["5.0.0", "vite@5.0.0", "packages/vite"]
        );
    }

    #[test]
    fn listing_ranks_versions_of_pattern() {
        let package = resolved_vite();

        assert_eq!(
            package.listing(20),
            vec![
                "5.0.0  https://github.com/vitejs/vite/tree/v5.0.0/packages/vite",
                "4.0.0  https://github.com/vitejs/vite/tree/v4.0.0/packages/vite",
            ]
        );
    }

    #[tokio::test]
    async fn compare_url_defaults_missing_side_to_manifest_version() {
        let mut packages = MockPackageRegistry::new();
        packages.expect_resolve_version().times(0);

        let url = lookup(packages, MockTagRegistry::new())
            .compare_url(&resolved_vite(), "4.0.0")
            .await
            .unwrap();

        assert_eq!(url, "https://github.com/vitejs/vite/compare/v4.0.0...v5.0.0");
    }

    #[tokio::test]
    async fn compare_url_resolves_specifiers_with_two_dot_range() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_resolve_version()
            .withf(|name, spec| name == "vite" && spec == "^4")
            .times(1)
            .returning(|_, _| Ok(Some("4.5.1".to_string())));

        let url = lookup(packages, MockTagRegistry::new())
            .compare_url(&resolved_vite(), "^4..latest")
            .await
            .unwrap();

        assert_eq!(url, "https://github.com/vitejs/vite/compare/v4.5.1..v5.0.0");
    }

    #[tokio::test]
    async fn compare_url_treats_empty_side_as_latest() {
        let url = lookup(MockPackageRegistry::new(), MockTagRegistry::new())
            .compare_url(&resolved_vite(), "4.0.0...")
            .await
            .unwrap();

        assert_eq!(url, "https://github.com/vitejs/vite/compare/v4.0.0...v5.0.0");
    }

    #[tokio::test]
    async fn compare_url_reports_unresolvable_specifier() {
        let mut packages = MockPackageRegistry::new();
        packages
            .expect_resolve_version()
            .returning(|_, _| Ok(None));

        let result = lookup(packages, MockTagRegistry::new())
            .compare_url(&resolved_vite(), "^99")
            .await;

        assert!(matches!(
            result,
            Err(LookupError::UnresolvedVersion { spec, .. }) if spec == "^99"
        ));
    }

    #[tokio::test]
    async fn compare_url_rejects_more_than_two_sides() {
        let result = lookup(MockPackageRegistry::new(), MockTagRegistry::new())
            .compare_url(&resolved_vite(), "1.0.0..2.0.0..3.0.0")
            .await;

        assert!(matches!(result, Err(LookupError::InvalidCompareRange(_))));
    }
}
