//! GitHub URLs for released versions

use crate::repo::url::RepoRef;
use crate::version::pattern::TagPattern;

const GITHUB_URL: &str = "https://github.com";

/// Range notation of a GitHub compare URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareRange {
    /// `a..b`: commits in `b` not in `a`
    TwoDot,
    /// `a...b`: changes since the merge base
    ThreeDot,
}

impl CompareRange {
    /// Range notation requested by user input: two dots only when `..` is
    /// written without `...`, three dots otherwise.
    pub fn detect(spec: &str) -> Self {
        if spec.contains("...") || !spec.contains("..") {
            CompareRange::ThreeDot
        } else {
            CompareRange::TwoDot
        }
    }

    pub fn separator(&self) -> &'static str {
        match self {
            CompareRange::TwoDot => "..",
            CompareRange::ThreeDot => "...",
        }
    }
}

/// Composes URLs of a repository whose tags follow `pattern`
#[derive(Debug, Clone, Copy)]
pub struct RepoUrlBuilder<'a> {
    repo: &'a RepoRef,
    pattern: &'a TagPattern,
}

impl<'a> RepoUrlBuilder<'a> {
    pub fn new(repo: &'a RepoRef, pattern: &'a TagPattern) -> Self {
        Self { repo, pattern }
    }

    /// `https://github.com/{repo}/tree/{tag}[/{folder}]`
    pub fn tree_url(&self, version: &str) -> String {
        let folder = self.repo.folder();
        let mut url = format!(
            "{}/{}/tree/{}",
            GITHUB_URL,
            self.repo.repo(),
            self.pattern.apply(version)
        );
        if !folder.is_empty() {
            url.push('/');
            url.push_str(folder);
        }
        url
    }

    /// `https://github.com/{repo}/compare/{tag}..{tag}` or with `...`
    pub fn compare_url(&self, from: &str, to: &str, range: CompareRange) -> String {
        format!(
            "{}/{}/compare/{}{}{}",
            GITHUB_URL,
            self.repo.repo(),
            self.pattern.apply(from),
            range.separator(),
            self.pattern.apply(to)
        )
    }

    /// One `{version}  {tree url}` line per version, versions padded to a
    /// common width.
    pub fn listing(&self, versions: &[String]) -> Vec<String> {
        let width = versions.iter().map(|v| v.len()).max().unwrap_or(0);
        versions
            .iter()
            .map(|v| format!("{:<width$}  {}", v, self.tree_url(v)))
            .collect()
    }

    /// sed script turning a version into its tag, e.g. `s/.*/v&/`
    pub fn sed_script(&self) -> String {
        format!("s/.*/{}/", self.pattern.apply("&"))
    }
}
