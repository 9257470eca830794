//! Path matchers for redirect rules.

mod path;

pub use path::{wildcard_to_regex, PathMatcher};

use crate::config::RedirectRule;

/// Result of a match operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the match succeeded
    pub matched: bool,
    /// Positional capture groups; index 0 holds group 1
    pub captures: Vec<String>,
}

impl MatchResult {
    /// Create a successful match result.
    pub fn matched() -> Self {
        Self {
            matched: true,
            captures: Vec::new(),
        }
    }

    /// Create a successful match result with captures.
    pub fn matched_with_captures(captures: Vec<String>) -> Self {
        Self {
            matched: true,
            captures,
        }
    }

    /// Create a failed match result.
    pub fn not_matched() -> Self {
        Self::default()
    }

    /// Captured group `index` (1-based).
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.captures.get(i))
            .map(String::as_str)
    }
}

/// A rule with its compiled matcher.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: RedirectRule,
    matcher: PathMatcher,
}

impl CompiledRule {
    pub fn compile(rule: &RedirectRule) -> Result<Self, MatcherError> {
        Ok(Self {
            rule: rule.clone(),
            matcher: PathMatcher::compile(rule)?,
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    pub fn matches(&self, path: &str) -> MatchResult {
        self.matcher.matches(path)
    }

    pub fn group_count(&self) -> usize {
        self.matcher.group_count()
    }
}

/// Compile the active rules once, in input order.
///
/// Rules whose pattern does not compile are left out; they never match.
pub fn compile_active<'a>(rules: impl IntoIterator<Item = &'a RedirectRule>) -> Vec<CompiledRule> {
    rules
        .into_iter()
        .filter(|r| r.is_active)
        .filter_map(|r| CompiledRule::compile(r).ok())
        .collect()
}

/// Check whether `rule` matches `path`.
///
/// A rule whose pattern does not compile never matches.
pub fn matches(path: &str, rule: &RedirectRule) -> bool {
    PathMatcher::compile(rule)
        .map(|m| m.is_match(path))
        .unwrap_or(false)
}

/// Errors that can occur during matcher compilation.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}
