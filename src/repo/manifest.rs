//! package.json manifest and its repository field

use serde::{Deserialize, Serialize};
use url::Url;

use crate::repo::hosted::HostedRepo;

/// The parts of a package.json this tool reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryField>,
}

/// The `repository` field, either a bare URL or an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    /// `"repository": "github:owner/repo"`
    Url(String),
    /// `"repository": { "type": "git", "url": "...", "directory": "packages/a" }`
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
    },
    /// Anything else, kept so that an odd field does not fail the manifest
    Other(serde_json::Value),
}

impl Manifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: None,
            version: version.into(),
            repository: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_repository(mut self, repository: RepositoryField) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Browse URL of the declared repository, e.g.
    /// `https://github.com/vitejs/vite/tree/HEAD/packages/vite`.
    ///
    /// Returns None when the manifest declares no usable repository.
    pub fn repository_url(&self) -> Option<String> {
        let (raw, directory) = match self.repository.as_ref()? {
            RepositoryField::Url(url) => (url.as_str(), None),
            RepositoryField::Detailed {
                url: Some(url),
                directory,
            } => (url.as_str(), directory.as_deref()),
            _ => return None,
        };
        normalize_repository_url(raw, directory)
    }
}

/// Rewrite a repository URL to its `https://` browse form.
///
/// Known hosts accept every shorthand and transport form; `directory`
/// points the URL into a monorepo folder. Other hosts only need to be a
/// valid absolute URL and lose the `.git` suffix.
pub fn normalize_repository_url(raw: &str, directory: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let stripped = raw.strip_prefix("git+").unwrap_or(raw);
    if let Some(hosted) = HostedRepo::from_url(stripped) {
        return Some(hosted.browse(directory));
    }

    let url = Url::parse(raw).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let path = url.path();
    let path = path.strip_suffix(".git").unwrap_or(path);
    Some(format!("https://{host}{path}"))
}
