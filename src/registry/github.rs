//! GitHub tag listing
//!
//! Tags are read from the git smart-HTTP ref advertisement first, which
//! needs a single cheap request and no API quota, and from the REST refs
//! endpoint if that fails.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, RegistriesConfig};
use crate::error::RegistryError;
use crate::registry::TagRegistry;
use crate::repo::url::is_repo_id;

const TAG_REF_PREFIX: &str = "refs/tags/";

/// Suffix of peeled annotated tag entries in a ref advertisement
const PEELED_SUFFIX: &str = "^{}";

/// Entry of the GitHub `git/refs/tags` API response
#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    reference: String,
}

/// Tag registry implementation for GitHub
pub struct GitHubRegistry {
    client: reqwest::Client,
    web_url: String,
    api_url: String,
}

impl GitHubRegistry {
    /// Creates a new GitHubRegistry with custom base URLs
    pub fn new(web_url: &str, api_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("npm-repo")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            web_url: web_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &RegistriesConfig) -> Self {
        Self::new(&config.github, &config.github_api)
    }

    /// Same as `git ls-remote --tags`
    async fn fetch_from_ref_advertisement(&self, repo: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!(
            "{}/{}/info/refs?service=git-upload-pack",
            self.web_url, repo
        );
        debug!("Fetching ref advertisement: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repo.to_string()));
        }

        if !status.is_success() {
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.text().await?;
        Ok(scan_tag_refs(&body))
    }

    async fn fetch_from_api(&self, repo: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/repos/{}/git/refs/tags", self.api_url, repo);
        debug!("Fetching tags from GitHub API: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        // the API answers 404 for repositories without tags as well
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repo.to_string()));
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let refs: Vec<GitRef> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub refs response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(refs
            .into_iter()
            .filter_map(|r| r.reference.strip_prefix(TAG_REF_PREFIX).map(String::from))
            .collect())
    }
}

impl Default for GitHubRegistry {
    fn default() -> Self {
        Self::from_config(&RegistriesConfig::default())
    }
}

#[async_trait::async_trait]
impl TagRegistry for GitHubRegistry {
    async fn fetch_tags(&self, repo: &str) -> Vec<String> {
        if !is_repo_id(repo) {
            debug!("Not a GitHub repository id: {:?}", repo);
            return Vec::new();
        }

        match self.fetch_from_ref_advertisement(repo).await {
            Ok(tags) => return tags,
            Err(e) => debug!("Ref advertisement of {} failed: {}", repo, e),
        }

        match self.fetch_from_api(repo).await {
            Ok(tags) => tags,
            Err(e) => {
                debug!("Tag listing of {} failed: {}", repo, e);
                Vec::new()
            }
        }
    }
}

/// Collect tag names from a git ref advertisement, skipping peeled entries.
fn scan_tag_refs(advertisement: &str) -> Vec<String> {
    advertisement
        .lines()
        .filter_map(|line| {
            let start = line.find(TAG_REF_PREFIX)? + TAG_REF_PREFIX.len();
            // the first ref line carries capabilities after a NUL byte
            line[start..].split('\0').next()
        })
        .filter(|tag| !tag.is_empty() && !tag.ends_with(PEELED_SUFFIX))
        .map(String::from)
        .collect()
}
