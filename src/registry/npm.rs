//! npm CDN implementation
//!
//! Manifests come from package CDNs (unpkg, then esm.sh) which serve the
//! package.json of the latest version at `/{name}/package.json`. Version
//! specifiers are resolved by the jsDelivr data API.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{FETCH_TIMEOUT_MS, RegistriesConfig};
use crate::error::RegistryError;
use crate::registry::PackageRegistry;
use crate::repo::manifest::Manifest;

/// Response from the jsDelivr `resolved` endpoint
#[derive(Debug, Deserialize)]
struct ResolvedResponse {
    version: Option<String>,
}

/// Registry implementation over npm CDNs
pub struct CdnRegistry {
    client: reqwest::Client,
    manifest_urls: Vec<String>,
    resolve_url: String,
}

impl CdnRegistry {
    /// Creates a new CdnRegistry
    ///
    /// # Arguments
    /// * `manifest_urls` - Base URLs serving `/{name}/package.json`, tried in order
    /// * `resolve_url` - Base URL of the jsDelivr data API
    pub fn new(manifest_urls: Vec<String>, resolve_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("npm-repo")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            manifest_urls: manifest_urls
                .into_iter()
                .map(|url| url.trim_end_matches('/').to_string())
                .collect(),
            resolve_url: resolve_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &RegistriesConfig) -> Self {
        Self::new(config.manifest.clone(), &config.resolve)
    }

    async fn fetch_manifest_from(
        &self,
        base_url: &str,
        package_name: &str,
    ) -> Result<Manifest, RegistryError> {
        let url = format!("{}/{}/package.json", base_url, package_name);
        debug!("Fetching manifest: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("Manifest source returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse manifest from {}: {}", url, e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for CdnRegistry {
    fn default() -> Self {
        Self::from_config(&RegistriesConfig::default())
    }
}

#[async_trait::async_trait]
impl PackageRegistry for CdnRegistry {
    async fn fetch_manifest(&self, package_name: &str) -> Result<Manifest, RegistryError> {
        let mut last_error = RegistryError::NotFound(package_name.to_string());

        for base_url in &self.manifest_urls {
            match self.fetch_manifest_from(base_url, package_name).await {
                Ok(manifest) => return Ok(manifest),
                Err(e) => {
                    debug!(
                        "Manifest of {} unavailable from {}: {}",
                        package_name, base_url, e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn resolve_version(
        &self,
        package_name: &str,
        spec: &str,
    ) -> Result<Option<String>, RegistryError> {
        let mut url = Url::parse(&format!(
            "{}/v1/packages/npm/{}/resolved",
            self.resolve_url, package_name
        ))?;
        url.query_pairs_mut().append_pair("specifier", spec);
        debug!("Resolving version: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("jsDelivr returned status {} for {}@{}", status, package_name, spec);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let resolved: ResolvedResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse jsDelivr response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(resolved.version)
    }
}
