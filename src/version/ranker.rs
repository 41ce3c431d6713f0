//! Ordering of tag-derived versions
//!
//! The ordering is a loose numeric one rather than semver precedence:
//! components are compared as integers (or by their first digit run), so
//! `1.0.0-rc.1` ranks above `1.0.0` and `alpha` equals `beta`.

use std::cmp::Ordering;

use regex::Regex;

use crate::version::pattern::TagPattern;
use crate::version::semver::{self, SEMVER_PATTERN};

/// Build a regex matching a whole tag of `pattern`, capturing the version
fn tag_regex(pattern: &TagPattern) -> Regex {
    let source = format!(
        "^{}(?P<version>{}){}$",
        regex::escape(pattern.prefix()),
        SEMVER_PATTERN,
        regex::escape(pattern.suffix())
    );
    Regex::new(&source).expect("escaped tag pattern is a valid regex")
}

/// Extract the version of every tag that fully matches `pattern`, keeping
/// the tag order. Tags of other shapes are dropped.
pub fn extract_versions(tags: &[String], pattern: &TagPattern) -> Vec<String> {
    let re = tag_regex(pattern);
    tags.iter()
        .filter_map(|tag| re.captures(tag))
        .filter_map(|caps| caps.name("version").map(|m| m.as_str().to_string()))
        .collect()
}

/// Extract versions from `tags` and return the `limit` highest, highest first.
pub fn rank_versions(tags: &[String], pattern: &TagPattern, limit: usize) -> Vec<String> {
    let mut versions = extract_versions(tags, pattern);
    versions.sort_by(|a, b| compare_descending(a, b));
    versions.truncate(limit);
    versions
}

/// Descending comparison over (major, minor, patch, prerelease, build).
///
/// Components are compared by numeric value in precedence order; a tie
/// falls through to the next component.
pub fn compare_descending(a: &str, b: &str) -> Ordering {
    let (Some(a), Some(b)) = (semver::find(a), semver::find(b)) else {
        return Ordering::Equal;
    };

    a.components()
        .into_iter()
        .zip(b.components())
        .fold(Ordering::Equal, |ordering, (x, y)| {
            ordering.then_with(|| component_value(y).cmp(&component_value(x)))
        })
}

/// Integer value of a version component.
///
/// Whole base-10 integers parse as themselves. Anything else uses its first
/// run of digits, and a component without digits (or an absent one) is 0.
fn component_value(component: Option<&str>) -> u64 {
    let Some(component) = component else {
        return 0;
    };

    if let Ok(n) = component.parse::<u64>() {
        return n;
    }

    let Some(start) = component.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };
    let digits: String = component[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(u64::MAX)
}
