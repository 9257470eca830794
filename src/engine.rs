//! Request-time redirect engine.
//!
//! Rules are compiled once, in resolution order, and the engine is immutable
//! afterwards so it can be shared across request handlers.

use crate::config::{ConfigError, RedirectConfig, RedirectStatus, RulePattern};
use crate::context::RequestInfo;
use crate::matcher::{CompiledRule, MatchResult};
use crate::resolver::evaluation_order;
use crate::transformer::{apply_query, substitute};
use crate::validator::validate_all_with;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// A resolved redirect, ready to be emitted as a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Id of the winning rule
    pub rule_id: String,
    /// Status code to emit
    pub status: RedirectStatus,
    /// Value for the `Location` header
    pub location: String,
}

/// Compiled, priority-ordered redirect rules.
#[derive(Debug, Clone)]
pub struct RedirectEngine {
    rules: Vec<CompiledRule>,
}

impl RedirectEngine {
    /// Compile the active rules of a configuration.
    ///
    /// Rules whose pattern does not compile are skipped and never match.
    /// With `settings.reject_invalid`, a rule set with validation errors is
    /// refused instead.
    pub fn new(config: &RedirectConfig) -> Result<Self, EngineError> {
        if config.settings.reject_invalid {
            let invalid: Vec<String> = validate_all_with(&config.rules, &config.settings)
                .into_iter()
                .filter(|(_, result)| !result.is_valid)
                .map(|(id, _)| id)
                .collect();

            if !invalid.is_empty() {
                return Err(EngineError::InvalidRules { ids: invalid });
            }
        }

        let mut rules = Vec::new();
        for rule in evaluation_order(&config.rules) {
            match CompiledRule::compile(rule) {
                Ok(compiled) => rules.push(compiled),
                Err(e) => {
                    warn!(
                        rule = %rule.id,
                        error = %e,
                        "Skipping redirect rule with invalid pattern"
                    );
                }
            }
        }

        info!(
            rules = rules.len(),
            configured = config.rules.len(),
            "Redirect engine initialized"
        );

        Ok(Self { rules })
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        Self::new(&RedirectConfig::from_yaml(yaml)?)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Self::new(&RedirectConfig::from_json(json)?)
    }

    /// Compiled rules in evaluation order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Find the first compiled rule matching `path`, with its captures.
    pub fn find_match(&self, path: &str) -> Option<(&CompiledRule, MatchResult)> {
        self.rules.iter().find_map(|compiled| {
            let result = compiled.matches(path);
            result.matched.then_some((compiled, result))
        })
    }

    /// Resolve a request to a redirect.
    pub fn resolve(&self, request: &RequestInfo) -> Option<Redirect> {
        let Some((compiled, result)) = self.find_match(&request.path) else {
            trace!(path = %request.path, "No matching redirect rule");
            return None;
        };

        let rule = &compiled.rule;
        let destination = match rule.pattern {
            RulePattern::Exact { .. } => rule.to.clone(),
            _ => substitute(&rule.to, &result.captures),
        };
        let location = apply_query(&destination, request.query(), rule.query_string_handling);

        debug!(
            path = %request.path,
            rule = %rule.id,
            status = rule.status_code.code(),
            location = %location,
            "Matched redirect rule"
        );

        Some(Redirect {
            rule_id: rule.id.clone(),
            status: rule.status_code,
            location,
        })
    }

    /// Resolve a raw request target such as `/old?page=2`.
    pub fn resolve_uri(&self, uri: &str) -> Option<Redirect> {
        self.resolve(&RequestInfo::parse(uri))
    }
}

/// Redirect engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{} rule(s) failed validation: {}", .ids.len(), .ids.join(", "))]
    InvalidRules { ids: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QueryStringHandling, RedirectRule};

    fn engine(rules: Vec<RedirectRule>) -> RedirectEngine {
        RedirectEngine::new(&RedirectConfig::with_rules(rules)).unwrap()
    }

    #[test]
    fn test_exact_redirect() {
        let engine = engine(vec![
            RedirectRule::exact("a", "/old", "/new").with_status(RedirectStatus::Found)
        ]);
        let redirect = engine.resolve_uri("/old").unwrap();

        assert_eq!(redirect.rule_id, "a");
        assert_eq!(redirect.status, RedirectStatus::Found);
        assert_eq!(redirect.location, "/new");
    }

    #[test]
    fn test_wildcard_with_preserved_query() {
        let engine = engine(vec![RedirectRule::wildcard("w", "/blog/*", "/articles/$1")]);
        let redirect = engine.resolve_uri("/blog/my-post?ref=home").unwrap();
        assert_eq!(redirect.location, "/articles/my-post?ref=home");
    }

    #[test]
    fn test_query_not_used_for_matching() {
        let engine = engine(vec![RedirectRule::exact("a", "/old", "/new")
            .with_query_handling(QueryStringHandling::Ignore)]);
        let redirect = engine.resolve_uri("/old?x=1").unwrap();
        assert_eq!(redirect.location, "/new");
    }

    #[test]
    fn test_priority_order() {
        let engine = engine(vec![
            RedirectRule::wildcard("catch-all", "/*", "/").with_priority(-10),
            RedirectRule::exact("specific", "/pricing", "/plans"),
        ]);
        assert_eq!(engine.rules()[0].rule.id, "specific");
        assert_eq!(engine.resolve_uri("/pricing").unwrap().rule_id, "specific");
        assert_eq!(engine.resolve_uri("/anything").unwrap().rule_id, "catch-all");
    }

    #[test]
    fn test_inactive_not_compiled() {
        let engine = engine(vec![RedirectRule::exact("a", "/a", "/b").inactive()]);
        assert!(engine.rules().is_empty());
        assert!(engine.resolve_uri("/a").is_none());
    }

    #[test]
    fn test_invalid_regex_skipped() {
        let engine = engine(vec![
            RedirectRule::regex("bad", "(unclosed", "/x").with_priority(10),
            RedirectRule::regex("good", r"^/p/(\d+)$", "/products/$1"),
        ]);
        assert_eq!(engine.rules().len(), 1);
        assert_eq!(engine.resolve_uri("/p/7").unwrap().location, "/products/7");
    }

    #[test]
    fn test_reject_invalid() {
        let mut config = RedirectConfig::with_rules(vec![
            RedirectRule::exact("a", "/a", "/b"),
            RedirectRule::exact("b", "/b", "/a"),
        ]);
        assert!(RedirectEngine::new(&config).is_ok());

        config.settings.reject_invalid = true;
        let err = RedirectEngine::new(&config).unwrap_err();
        match err {
            EngineError::InvalidRules { ids } => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
