//! Loose semantic version matching
//!
//! Recognizes `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` inside arbitrary text,
//! e.g. the version part of a git tag such as `create-vite@5.0.0-beta.1`.
//! The grammar has no `v` prefix and tolerates a prerelease without the
//! leading hyphen (`1.2.3beta`).

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Regex source for a loose semantic version, unanchored.
///
/// Capture groups: 1 major, 2 minor, 3 patch, 4 prerelease, 5 build metadata.
pub const SEMVER_PATTERN: &str = r"(\d+)\.(\d+)\.(\d+)(?:-?((?:\d+|\d*[A-Za-z-][\dA-Za-z-]*)(?:\.(?:\d+|\d*[A-Za-z-][\dA-Za-z-]*))*))?(?:\+([\dA-Za-z-]+(?:\.[\dA-Za-z-]+)*))?";

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SEMVER_PATTERN).expect("semver pattern is a valid regex"));

static EXACT_SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{SEMVER_PATTERN})$")).expect("semver pattern is a valid regex")
});

/// A version literal located inside a larger string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemverMatch<'a> {
    /// Byte offset of the first character of the version
    pub start: usize,
    /// Byte offset just past the version
    pub end: usize,
    pub major: &'a str,
    pub minor: &'a str,
    pub patch: &'a str,
    pub prerelease: Option<&'a str>,
    pub build: Option<&'a str>,
}

impl<'a> SemverMatch<'a> {
    fn from_captures(caps: regex::Captures<'a>) -> Option<Self> {
        let whole = caps.get(0)?;
        Some(Self {
            start: whole.start(),
            end: whole.end(),
            major: caps.get(1)?.as_str(),
            minor: caps.get(2)?.as_str(),
            patch: caps.get(3)?.as_str(),
            prerelease: caps.get(4).map(|m| m.as_str()),
            build: caps.get(5).map(|m| m.as_str()),
        })
    }

    /// Byte range of the version within the searched string
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The five comparable components in precedence order.
    pub fn components(&self) -> [Option<&'a str>; 5] {
        [
            Some(self.major),
            Some(self.minor),
            Some(self.patch),
            self.prerelease,
            self.build,
        ]
    }
}

/// Find the leftmost version literal in `haystack`.
pub fn find(haystack: &str) -> Option<SemverMatch<'_>> {
    SEMVER_RE
        .captures(haystack)
        .and_then(SemverMatch::from_captures)
}

/// Returns true if the whole string is a version literal, with nothing
/// before or after it.
pub fn is_exact(s: &str) -> bool {
    EXACT_SEMVER_RE.is_match(s)
}
