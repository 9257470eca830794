//! Path matching implementation.

use super::{MatchResult, MatcherError};
use crate::config::{RedirectRule, RulePattern};
use regex::{Regex, RegexBuilder};

/// Compiled path matcher for one rule.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Exact string match
    Exact {
        pattern: String,
        case_sensitive: bool,
    },
    /// Wildcard or regex pattern, compiled to a regex
    Regex(Regex),
}

impl PathMatcher {
    /// Compile the matcher for a rule.
    pub fn compile(rule: &RedirectRule) -> Result<Self, MatcherError> {
        Self::compile_pattern(&rule.pattern, rule.case_sensitive)
    }

    /// Compile a pattern with the given case sensitivity.
    pub fn compile_pattern(
        pattern: &RulePattern,
        case_sensitive: bool,
    ) -> Result<Self, MatcherError> {
        match pattern {
            RulePattern::Exact { from } => Ok(Self::Exact {
                pattern: if case_sensitive {
                    from.clone()
                } else {
                    from.to_lowercase()
                },
                case_sensitive,
            }),
            RulePattern::Wildcard { from } => {
                let regex = build_regex(&wildcard_to_regex(from), case_sensitive)?;
                Ok(Self::Regex(regex))
            }
            RulePattern::Regex { from } => Ok(Self::Regex(build_regex(from, case_sensitive)?)),
        }
    }

    /// Test without extracting captures.
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Exact {
                pattern,
                case_sensitive: true,
            } => path == pattern.as_str(),
            Self::Exact {
                pattern,
                case_sensitive: false,
            } => path.to_lowercase() == *pattern,
            Self::Regex(regex) => regex.is_match(path),
        }
    }

    /// Match and collect positional captures.
    pub fn matches(&self, path: &str) -> MatchResult {
        match self {
            Self::Exact { .. } => {
                if self.is_match(path) {
                    MatchResult::matched()
                } else {
                    MatchResult::not_matched()
                }
            }
            Self::Regex(regex) => match regex.captures(path) {
                Some(caps) => {
                    let captures = caps
                        .iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect();
                    MatchResult::matched_with_captures(captures)
                }
                None => MatchResult::not_matched(),
            },
        }
    }

    /// Number of capture groups the pattern produces.
    pub fn group_count(&self) -> usize {
        match self {
            Self::Exact { .. } => 0,
            Self::Regex(regex) => regex.captures_len() - 1,
        }
    }
}

/// Translate a wildcard pattern into an anchored regex source.
///
/// Every `*` becomes a greedy capturing `(.*)`; everything else is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.*)");
    format!("^{}$", body)
}

fn build_regex(source: &str, case_sensitive: bool) -> Result<Regex, MatcherError> {
    Ok(RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .build()?)
}
