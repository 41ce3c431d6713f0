//! Recognition of hosted git repository URLs
//!
//! package.json `repository` fields come in many shapes. All of these name
//! the same repository:
//!
//! - `github:vitejs/vite`
//! - `vitejs/vite`
//! - `git@github.com:vitejs/vite.git`
//! - `git://github.com/vitejs/vite.git`
//! - `ssh://git@github.com/vitejs/vite.git`
//! - `ssh://git@github.com:vitejs/vite.git`
//! - `https://github.com/vitejs/vite`
//!
//! [`HostedRepo::from_url`] reduces them to host, owner and project, and
//! [`HostedRepo::browse`] renders the canonical `https://` browse URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// `owner/project` with no scheme, host or user info
static SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^:@%/\s.-][^:@%/\s]*/[^:@\s/%]+$").expect("shorthand pattern is a valid regex")
});

const PROTOCOLS: [&str; 4] = ["https", "http", "git", "ssh"];

/// Git hosting services with a known URL layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHost {
    GitHub,
    GitLab,
    Bitbucket,
}

impl GitHost {
    pub fn domain(&self) -> &'static str {
        match self {
            GitHost::GitHub => "github.com",
            GitHost::GitLab => "gitlab.com",
            GitHost::Bitbucket => "bitbucket.org",
        }
    }

    /// Path segment that precedes a ref in browse URLs
    fn tree_path(&self) -> &'static str {
        match self {
            GitHost::GitHub | GitHost::GitLab => "tree",
            GitHost::Bitbucket => "src",
        }
    }

    fn from_shortcut(name: &str) -> Option<Self> {
        match name {
            "github" => Some(GitHost::GitHub),
            "gitlab" => Some(GitHost::GitLab),
            "bitbucket" => Some(GitHost::Bitbucket),
            _ => None,
        }
    }

    fn from_domain(host: &str) -> Option<Self> {
        let host = host.strip_prefix("www.").unwrap_or(host);
        [GitHost::GitHub, GitHost::GitLab, GitHost::Bitbucket]
            .into_iter()
            .find(|h| h.domain() == host)
    }
}

/// A repository on a known git host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedRepo {
    pub host: GitHost,
    pub owner: String,
    pub project: String,
    /// Branch, tag or commit named by a `#fragment` or a `/tree/<ref>` path
    pub committish: Option<String>,
}

impl HostedRepo {
    /// Recognize a hosted repository URL or shorthand.
    ///
    /// Expects any `git+` transport prefix to be stripped already. Returns
    /// None for unknown hosts and unrecognized shapes.
    pub fn from_url(input: &str) -> Option<Self> {
        let input = input.trim();
        let (body, committish) = match input.split_once('#') {
            Some((body, fragment)) if !fragment.is_empty() => (body, Some(fragment.to_string())),
            Some((body, _)) => (body, None),
            None => (input, None),
        };

        if let Some((scheme, rest)) = body.split_once(':')
            && let Some(host) = GitHost::from_shortcut(scheme)
        {
            return Self::from_path(host, rest, committish);
        }

        if SHORTHAND_RE.is_match(body) {
            return Self::from_path(GitHost::GitHub, body, committish);
        }

        let url = if body.contains("://") {
            Url::parse(body)
                .ok()
                .or_else(|| Url::parse(&replace_scp_colon(body)?).ok())?
        } else {
            // scp-like syntax: [user@]host:owner/project
            let (authority, path) = body.split_once(':')?;
            Url::parse(&format!("ssh://{}/{}", authority, path.trim_start_matches('/'))).ok()?
        };

        if !PROTOCOLS.contains(&url.scheme()) {
            return None;
        }
        let host = GitHost::from_domain(url.host_str()?)?;
        Self::from_path(host, url.path(), committish)
    }

    fn from_path(host: GitHost, path: &str, committish: Option<String>) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (owner, project, committish) = match host {
            GitHost::GitHub => match segments.as_slice() {
                [owner, project] => (owner.to_string(), *project, committish),
                [owner, project, "tree", reference, ..] => (
                    owner.to_string(),
                    *project,
                    committish.or_else(|| Some(reference.to_string())),
                ),
                _ => return None,
            },
            // GitLab nests projects in groups: group/subgroup/project
            GitHost::GitLab => {
                if segments.contains(&"-") {
                    return None;
                }
                let (project, groups) = segments.split_last()?;
                if groups.is_empty() {
                    return None;
                }
                (groups.join("/"), *project, committish)
            }
            GitHost::Bitbucket => match segments.as_slice() {
                [owner, project, ..] => (owner.to_string(), *project, committish),
                _ => return None,
            },
        };

        let project = project.strip_suffix(".git").unwrap_or(project);
        if project.is_empty() {
            return None;
        }

        Some(Self {
            host,
            owner,
            project: project.to_string(),
            committish,
        })
    }

    /// Canonical browse URL, optionally pointing into `directory`.
    ///
    /// A directory is addressed at the committish, or `HEAD` if there is none.
    pub fn browse(&self, directory: Option<&str>) -> String {
        let base = format!(
            "https://{}/{}/{}",
            self.host.domain(),
            self.owner,
            self.project
        );
        let directory = directory
            .map(|d| d.trim_start_matches('/'))
            .filter(|d| !d.is_empty());

        match (directory, &self.committish) {
            (Some(dir), committish) => format!(
                "{}/{}/{}/{}",
                base,
                self.host.tree_path(),
                committish.as_deref().unwrap_or("HEAD"),
                dir
            ),
            (None, Some(committish)) => {
                format!("{}/{}/{}", base, self.host.tree_path(), committish)
            }
            (None, None) => base,
        }
    }
}

/// Rewrite `ssh://git@host:owner/project` to `ssh://git@host/owner/project`.
///
/// The colon must follow the user info, otherwise it is a password
/// separator. Returns None when there is nothing to rewrite.
fn replace_scp_colon(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let colon = rest.rfind(':')?;
    if rest.find('@').is_some_and(|at| colon < at) {
        return None;
    }
    Some(format!("{}://{}/{}", scheme, &rest[..colon], &rest[colon + 1..]))
}
