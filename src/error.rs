use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Malformed repository specifier: {0:?}, expected a GitHub URL or \"owner/repo\"")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Package \"{0}\" not found")]
    PackageNotFound(String),

    #[error("Repository URL not found in \"{0}\"")]
    RepositoryNotDeclared(String),

    #[error("Cannot handle repository URL \"{0}\"")]
    UnsupportedRepository(String),

    #[error("No tags found in repository of \"{0}\"")]
    NoTags(String),

    #[error("Failed to resolve \"{spec}\" in \"{package}\"")]
    UnresolvedVersion { package: String, spec: String },

    #[error("Invalid compare range \"{0}\", expected <from>..<to> or <from>...<to>")]
    InvalidCompareRange(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
