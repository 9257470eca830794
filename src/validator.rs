//! Rule validation: per-rule diagnostics and batch validation.
//!
//! Errors block publishing a rule set; warnings are advisory and never
//! affect validity. Every check runs, findings are collected rather than
//! short-circuited.

use crate::chain::detect_loop_compiled;
use crate::config::{MatchType, RedirectRule, Settings};
use crate::matcher::{compile_active, CompiledRule, MatcherError, PathMatcher};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Regex for `$n` placeholders in destinations.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap());

/// A single finding about a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("Redirect points to itself: {from}")]
    SelfRedirect { from: String },

    #[error("Redirect loop detected: {}", .chain.join(" → "))]
    Loop { chain: Vec<String> },

    #[error("Invalid regex pattern: {message}")]
    InvalidRegex { message: String },

    #[error("Long redirect chain ({} hops): {}", .chain.len().saturating_sub(1), .chain.join(" → "))]
    LongChain { chain: Vec<String> },

    #[error("Rule may never be reached: rule {duplicate_of} has the same {match_type} pattern")]
    Unreachable {
        duplicate_of: String,
        match_type: MatchType,
    },

    #[error("Pattern contains '*' but match type is {match_type}, expected wildcard")]
    StrayWildcard { match_type: MatchType },

    #[error("Pattern starts with '^' but match type is {match_type}, expected regex")]
    StrayAnchor { match_type: MatchType },

    #[error("Pattern does not start with '/'")]
    MissingLeadingSlash,

    #[error("Destination references ${index} but the pattern captures {available} group(s)")]
    UnknownPlaceholder { index: usize, available: usize },
}

impl Diagnostic {
    /// Whether this finding blocks publishing.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::SelfRedirect { .. } | Self::Loop { .. } | Self::InvalidRegex { .. }
        )
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validation outcome for one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate one rule against the full rule set with default settings.
pub fn validate(rule: &RedirectRule, rules: &[RedirectRule]) -> ValidationResult {
    validate_with(rule, rules, &Settings::default())
}

/// Validate one rule against the full rule set.
pub fn validate_with(
    rule: &RedirectRule,
    rules: &[RedirectRule],
    settings: &Settings,
) -> ValidationResult {
    validate_compiled(rule, rules, &compile_active(rules), settings)
}

/// Validate one rule; `compiled` is the active set from [`compile_active`].
fn validate_compiled(
    rule: &RedirectRule,
    rules: &[RedirectRule],
    compiled: &[CompiledRule],
    settings: &Settings,
) -> ValidationResult {
    let mut diagnostics = Vec::new();
    let from = rule.from();
    let match_type = rule.match_type();
    let self_redirect = from == rule.to;

    if self_redirect {
        diagnostics.push(Diagnostic::SelfRedirect {
            from: from.to_string(),
        });
    }

    let report = detect_loop_compiled(rule, compiled, settings.max_chain_depth);
    if report.chain.len() > settings.long_chain_threshold {
        diagnostics.push(Diagnostic::LongChain {
            chain: report.chain.clone(),
        });
    }
    // A self-redirect is already reported; its one-hop loop adds nothing.
    if report.has_loop && !self_redirect {
        diagnostics.push(Diagnostic::Loop {
            chain: report.chain,
        });
    }

    for other in rules
        .iter()
        .filter(|r| r.is_active && r.id != rule.id && same_pattern(rule, r))
    {
        diagnostics.push(Diagnostic::Unreachable {
            duplicate_of: other.id.clone(),
            match_type,
        });
    }

    let matcher = match PathMatcher::compile(rule) {
        Ok(matcher) => Some(matcher),
        Err(MatcherError::InvalidRegex(e)) => {
            diagnostics.push(Diagnostic::InvalidRegex {
                message: e.to_string(),
            });
            None
        }
    };

    if from.contains('*') && match_type != MatchType::Wildcard {
        diagnostics.push(Diagnostic::StrayWildcard { match_type });
    }

    if from.starts_with('^') && match_type != MatchType::Regex {
        diagnostics.push(Diagnostic::StrayAnchor { match_type });
    }

    if match_type != MatchType::Regex && !from.starts_with('/') {
        diagnostics.push(Diagnostic::MissingLeadingSlash);
    }

    if let Some(matcher) = matcher {
        let available = matcher.group_count();
        diagnostics.extend(
            unknown_placeholders(&rule.to, available)
                .into_iter()
                .map(|index| Diagnostic::UnknownPlaceholder { index, available }),
        );
    }

    ValidationResult::from_diagnostics(diagnostics)
}

/// Whether two rules match exactly the same paths as far as `from` shows.
///
/// Sources are compared case-folded when either rule ignores case.
fn same_pattern(a: &RedirectRule, b: &RedirectRule) -> bool {
    if a.match_type() != b.match_type() {
        return false;
    }
    if a.case_sensitive && b.case_sensitive {
        a.from() == b.from()
    } else {
        a.from().to_lowercase() == b.from().to_lowercase()
    }
}

/// Placeholder indices in `destination` that no capture group fills.
fn unknown_placeholders(destination: &str, available: usize) -> BTreeSet<usize> {
    PLACEHOLDER_REGEX
        .captures_iter(destination)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .filter(|&index| index == 0 || index > available)
        .collect()
}

/// Validate every active rule with default settings.
pub fn validate_all(rules: &[RedirectRule]) -> BTreeMap<String, ValidationResult> {
    validate_all_with(rules, &Settings::default())
}

/// Validate every active rule against the full set, keyed by rule id.
///
/// Inactive rules are skipped and absent from the result.
pub fn validate_all_with(
    rules: &[RedirectRule],
    settings: &Settings,
) -> BTreeMap<String, ValidationResult> {
    let compiled = compile_active(rules);
    rules
        .iter()
        .filter(|r| r.is_active)
        .map(|rule| {
            let result = validate_compiled(rule, rules, &compiled, settings);
            (rule.id.clone(), result)
        })
        .collect()
}

/// Aggregate counts over a batch validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub checked: usize,
    pub invalid: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    pub fn from_results(results: &BTreeMap<String, ValidationResult>) -> Self {
        results.values().fold(Self::default(), |mut acc, result| {
            acc.checked += 1;
            acc.invalid += usize::from(!result.is_valid);
            acc.errors += result.errors.len();
            acc.warnings += result.warnings.len();
            acc
        })
    }

    pub fn has_errors(&self) -> bool {
        self.invalid > 0
    }
}
