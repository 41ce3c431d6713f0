//! Version to tag pattern inference
//!
//! Repositories name their release tags in many ways: `v1.2.3`, `1.2.3`,
//! `create-vite@1.2.3`, `release-1.2.3`. A [`TagPattern`] captures such a
//! convention as the literal text around the version, written as a template
//! with a `{}` placeholder (`v{}`, `create-vite@{}`).

use std::fmt;

use indexmap::IndexMap;

use crate::version::semver;

/// The placeholder marking where the version goes in a template
pub const PLACEHOLDER: &str = "{}";

/// Score added when a hint is exactly the tag
const EXACT_HINT_SCORE: u64 = 1000;

/// Score added when a hint is a substring of the tag
const PARTIAL_HINT_SCORE: u64 = 10;

/// A "version -> tag" naming convention: the tag is `prefix + version + suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPattern {
    prefix: String,
    suffix: String,
}

impl TagPattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Derive the pattern of a single tag by replacing its leftmost version
    /// with the placeholder. Returns None if the tag carries no version.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let m = semver::find(tag)?;
        Some(Self::new(&tag[..m.start], &tag[m.end..]))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Substitute `version` for the placeholder
    pub fn apply(&self, version: &str) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }
}

impl Default for TagPattern {
    /// `v{}`, the most common convention
    fn default() -> Self {
        Self::new("v", "")
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, PLACEHOLDER, self.suffix)
    }
}

/// Infer the dominant tag pattern of a repository.
///
/// Every tag holding a version votes once for its pattern. Each hint found
/// in a tag adds [`PARTIAL_HINT_SCORE`] to that tag's pattern, or
/// [`EXACT_HINT_SCORE`] if the hint is the whole tag. Typical hints are the
/// package version, `"{name}@{version}"` and the package folder.
///
/// Tags are visited from the end of the list to the start and patterns keep
/// the order in which they were first seen. The highest score wins and a
/// later pattern must score strictly higher to replace the current best, so
/// among equal scores the pattern first seen (from the last tag) wins.
///
/// Returns `v{}` when no tag carries a version.
pub fn infer_tag_pattern(tags: &[String], hints: &[String]) -> TagPattern {
    let mut scores: IndexMap<TagPattern, u64> = IndexMap::new();

    for tag in tags.iter().rev() {
        let Some(pattern) = TagPattern::from_tag(tag) else {
            continue;
        };

        let score = scores.entry(pattern).or_insert(0);
        *score += 1;
        for hint in hints {
            if tag.contains(hint.as_str()) {
                *score += if tag == hint {
                    EXACT_HINT_SCORE
                } else {
                    PARTIAL_HINT_SCORE
                };
            }
        }
    }

    let mut best = None;
    let mut max = 0;
    for (pattern, &score) in &scores {
        if score > max {
            max = score;
            best = Some(pattern);
        }
    }

    best.cloned().unwrap_or_default()
}
