//! Best-effort cache of package lookups
//!
//! Stores the manifest and tag list of each looked up package in SQLite,
//! so that repeated invocations within the freshness window skip the
//! network entirely.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::CacheError;
use crate::repo::manifest::Manifest;

/// A cached lookup result
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPackage {
    pub manifest: Manifest,
    pub tags: Vec<String>,
}

pub struct Cache {
    conn: Mutex<Connection>,
    /// Freshness window in milliseconds
    ttl: i64,
}

impl Cache {
    /// Open (or create) the cache database at `db_path`.
    pub fn new(db_path: &Path, ttl: i64) -> Result<Self, CacheError> {
        info!("Opening cache database at {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        // Enable WAL mode so concurrent invocations do not block each other
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let cache = Self {
            conn: Mutex::new(conn),
            ttl,
        };

        cache.create_schema()?;
        debug!("Cache initialized");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                package_name TEXT PRIMARY KEY,
                updated_at INTEGER NOT NULL,
                manifest TEXT NOT NULL,
                tags TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    /// Get the cached result for a package if it is still fresh.
    ///
    /// Stale entries are removed and reported as a miss.
    pub fn get(&self, package_name: &str) -> Result<Option<CachedPackage>, CacheError> {
        self.get_at(package_name, Self::current_timestamp_ms())
    }

    fn get_at(&self, package_name: &str, now: i64) -> Result<Option<CachedPackage>, CacheError> {
        let conn = self.lock_conn()?;

        let row: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT updated_at, manifest, tags FROM packages WHERE package_name = ?1",
                [package_name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((updated_at, manifest, tags)) = row else {
            debug!("Cache miss for {}", package_name);
            return Ok(None);
        };

        if now - updated_at >= self.ttl {
            debug!("Cache entry for {} expired, removing", package_name);
            conn.execute(
                "DELETE FROM packages WHERE package_name = ?1",
                [package_name],
            )?;
            return Ok(None);
        }

        debug!("Cache hit for {}", package_name);
        Ok(Some(CachedPackage {
            manifest: serde_json::from_str(&manifest)?,
            tags: serde_json::from_str(&tags)?,
        }))
    }

    /// Store the lookup result of a package, replacing any previous entry.
    pub fn put(
        &self,
        package_name: &str,
        manifest: &Manifest,
        tags: &[String],
    ) -> Result<(), CacheError> {
        self.put_at(package_name, manifest, tags, Self::current_timestamp_ms())
    }

    fn put_at(
        &self,
        package_name: &str,
        manifest: &Manifest,
        tags: &[String],
        now: i64,
    ) -> Result<(), CacheError> {
        debug!("Caching {} tags for {}", tags.len(), package_name);

        let manifest = serde_json::to_string(manifest)?;
        let tags = serde_json::to_string(tags)?;

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO packages (package_name, updated_at, manifest, tags)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(package_name) DO UPDATE SET
                updated_at = excluded.updated_at,
                manifest = excluded.manifest,
                tags = excluded.tags
            "#,
            (package_name, now, manifest, tags),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CACHE_TTL_MS;
    use crate::repo::manifest::RepositoryField;
    use tempfile::TempDir;

    fn create_test_cache() -> (TempDir, Cache) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let cache = Cache::new(&db_path, DEFAULT_CACHE_TTL_MS).unwrap();
        (temp_dir, cache)
    }

    fn manifest() -> Manifest {
        Manifest::new("5.0.0")
            .with_name("vite")
            .with_repository(RepositoryField::Url("github:vitejs/vite".to_string()))
    }

    fn tags() -> Vec<String> {
        vec!["v4.0.0".to_string(), "v5.0.0".to_string()]
    }

    #[test]
    fn new_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/dir/cache.db");

        Cache::new(&db_path, DEFAULT_CACHE_TTL_MS).unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn get_returns_none_for_unknown_package() {
        let (_temp_dir, cache) = create_test_cache();

        assert_eq!(cache.get("vite").unwrap(), None);
    }

    #[test]
    fn get_returns_fresh_entry() {
        let (_temp_dir, cache) = create_test_cache();
        cache.put_at("vite", &manifest(), &tags(), 1_000).unwrap();

        let cached = cache.get_at("vite", 1_000 + DEFAULT_CACHE_TTL_MS - 1).unwrap();

        assert_eq!(
            cached,
            Some(CachedPackage {
                manifest: manifest(),
                tags: tags(),
            })
        );
    }

    #[test]
    fn get_removes_expired_entry() {
        let (_temp_dir, cache) = create_test_cache();
        cache.put_at("vite", &manifest(), &tags(), 1_000).unwrap();

        let expired_at = 1_000 + DEFAULT_CACHE_TTL_MS;
        assert_eq!(cache.get_at("vite", expired_at).unwrap(), None);

        // gone even when asked with an earlier clock
        assert_eq!(cache.get_at("vite", 1_000).unwrap(), None);
    }

    #[test]
    fn put_replaces_existing_entry() {
        let (_temp_dir, cache) = create_test_cache();
        cache.put_at("vite", &manifest(), &tags(), 1_000).unwrap();

        let newer = Manifest::new("5.1.0").with_name("vite");
        let newer_tags = vec!["v5.1.0".to_string()];
        cache.put_at("vite", &newer, &newer_tags, 2_000).unwrap();

        let cached = cache.get_at("vite", 2_000).unwrap().unwrap();
        assert_eq!(cached.manifest, newer);
        assert_eq!(cached.tags, newer_tags);
    }
}
