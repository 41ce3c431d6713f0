//! GitHub repository references

use url::Url;

use crate::error::RepoError;

const GITHUB_HOST: &str = "github.com";

/// A GitHub repository plus an optional folder inside it.
///
/// `repo` is always `owner/name` with both parts non-empty. `folder` is a
/// `/`-joined path relative to the repository root, empty for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    repo: String,
    folder: String,
}

impl RepoRef {
    pub fn new(repo: impl Into<String>, folder: impl Into<String>) -> Result<Self, RepoError> {
        let repo = repo.into();
        if !is_repo_id(&repo) {
            return Err(RepoError::Malformed(repo));
        }
        Ok(Self {
            repo,
            folder: folder.into(),
        })
    }

    /// `owner/name`
    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn owner(&self) -> &str {
        self.split().0
    }

    pub fn name(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        self.repo.split_once('/').unwrap_or((&self.repo, ""))
    }
}

/// Returns true for `owner/name`: exactly one `/` with text on both sides.
pub fn is_repo_id(s: &str) -> bool {
    matches!(
        s.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    )
}

/// Parse a GitHub repository URL or an `owner/name` specifier.
///
/// Accepted forms:
/// - `https://github.com/vitejs/vite` -> `vitejs/vite`, no folder
/// - `https://github.com/vitejs/vite/tree/HEAD/packages/vite` -> `vitejs/vite`,
///   folder `packages/vite`
/// - `vitejs/vite` -> `vitejs/vite`, no folder
///
/// # Returns
/// * `Ok(Some(_))` - a recognized repository
/// * `Ok(None)` - an http(s) URL that is not a GitHub repository URL
/// * `Err(RepoError::Malformed)` - neither a URL nor `owner/name`
pub fn parse_repo(input: &str) -> Result<Option<RepoRef>, RepoError> {
    if input.starts_with("https://") || input.starts_with("http://") {
        return Ok(parse_github_url(input));
    }

    if is_repo_id(input) {
        return RepoRef::new(input, "").map(Some);
    }

    Err(RepoError::Malformed(input.to_string()))
}

fn parse_github_url(input: &str) -> Option<RepoRef> {
    let url = Url::parse(input).ok()?;
    if url.host_str() != Some(GITHUB_HOST) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let [owner, name, rest @ ..] = segments.as_slice() else {
        return None;
    };

    // tree/<ref>/<folder...>
    let folder = match rest {
        ["tree", _, folder @ ..] => folder.join("/"),
        _ => String::new(),
    };

    RepoRef::new(format!("{owner}/{name}"), folder).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/vitejs/vite", "vitejs/vite", "")]
    #[case("http://github.com/vitejs/vite/", "vitejs/vite", "")]
    #[case(
        "https://github.com/vitejs/vite/tree/HEAD/packages/vite",
        "vitejs/vite",
        "packages/vite"
    )]
    #[case(
        "https://github.com/babel/babel/tree/v7.0.0/packages/babel-core/",
        "babel/babel",
        "packages/babel-core"
    )]
    #[case("https://github.com/vitejs/vite/tree/main", "vitejs/vite", "")]
    #[case("https://github.com/vitejs/vite/issues", "vitejs/vite", "")]
    #[case("https://GitHub.com/vitejs/vite", "vitejs/vite", "")]
    #[case("vitejs/vite", "vitejs/vite", "")]
    fn parse_repo_recognizes_github_repositories(
        #[case] input: &str,
        #[case] repo: &str,
        #[case] folder: &str,
    ) {
        let result = parse_repo(input).unwrap().unwrap();

        assert_eq!(result.repo(), repo);
        assert_eq!(result.folder(), folder);
    }

    #[rstest]
    #[case("https://gitlab.com/owner/repo")]
    #[case("https://bitbucket.org/owner/repo")]
    #[case("https://github.com/owner")]
    #[case("https://github.com/")]
    #[case("https://")]
    fn parse_repo_returns_none_for_unrecognized_urls(#[case] input: &str) {
        assert_eq!(parse_repo(input).unwrap(), None);
    }

    #[rstest]
    #[case("owner")]
    #[case("owner/repo/extra")]
    #[case("/repo")]
    #[case("owner/")]
    #[case("")]
    fn parse_repo_rejects_malformed_specifier(#[case] input: &str) {
        assert!(matches!(parse_repo(input), Err(RepoError::Malformed(_))));
    }

    #[test]
    fn repo_ref_splits_owner_and_name() {
        let repo = RepoRef::new("vitejs/vite", "packages/vite").unwrap();

        assert_eq!(repo.owner(), "vitejs");
        assert_eq!(repo.name(), "vite");
        assert_eq!(repo.folder(), "packages/vite");
    }

    #[test]
    fn repo_ref_new_rejects_missing_separator() {
        assert!(matches!(
            RepoRef::new("vite", ""),
            Err(RepoError::Malformed(_))
        ));
    }
}
