//! Configuration types for the redirect engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Main configuration: engine settings plus the rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectConfig {
    /// Configuration version
    pub version: String,
    /// Global settings
    pub settings: Settings,
    /// Redirect rules (evaluated in priority order)
    pub rules: Vec<RedirectRule>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: Settings::default(),
            rules: vec![],
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of hops followed by the loop detector
    pub max_chain_depth: usize,
    /// Chains longer than this produce a warning
    pub long_chain_threshold: usize,
    /// Refuse to build an engine from a rule set that has validation errors
    pub reject_invalid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_chain_depth: crate::chain::DEFAULT_MAX_DEPTH,
            long_chain_threshold: 3,
            reject_invalid: false,
        }
    }
}

/// A single configured redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    /// Stable identifier (CMS documents use `_id`)
    #[serde(default, alias = "_id")]
    pub id: String,
    /// Source pattern and how to interpret it
    #[serde(flatten)]
    pub pattern: RulePattern,
    /// Destination path or absolute URL, may contain `$1`..`$n`
    pub to: String,
    /// Status code emitted for the redirect
    #[serde(default)]
    pub status_code: RedirectStatus,
    /// Inactive rules never resolve and are invisible to chain-following
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Priority (higher = evaluated first)
    #[serde(default)]
    pub priority: i32,
    /// Tie-breaker among equal priorities (ascending)
    #[serde(default)]
    pub order: i32,
    /// Whether `from` is compared case-sensitively
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// What happens to the incoming query string
    #[serde(default)]
    pub query_string_handling: QueryStringHandling,
    /// Free-form editor notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RedirectRule {
    /// Create an active rule with default metadata.
    pub fn new(id: impl Into<String>, pattern: RulePattern, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern,
            to: to.into(),
            status_code: RedirectStatus::default(),
            is_active: true,
            priority: 0,
            order: 0,
            case_sensitive: true,
            query_string_handling: QueryStringHandling::default(),
            notes: None,
        }
    }

    /// Shorthand for an exact rule.
    pub fn exact(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, RulePattern::Exact { from: from.into() }, to)
    }

    /// Shorthand for a wildcard rule.
    pub fn wildcard(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, RulePattern::Wildcard { from: from.into() }, to)
    }

    /// Shorthand for a regex rule.
    pub fn regex(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, RulePattern::Regex { from: from.into() }, to)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_status(mut self, status: RedirectStatus) -> Self {
        self.status_code = status;
        self
    }

    pub fn with_query_handling(mut self, handling: QueryStringHandling) -> Self {
        self.query_string_handling = handling;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The raw `from` pattern.
    pub fn from(&self) -> &str {
        self.pattern.source()
    }

    /// The match type governing `from`.
    pub fn match_type(&self) -> MatchType {
        self.pattern.match_type()
    }

    /// True when the destination leaves this origin.
    pub fn is_external(&self) -> bool {
        is_external(&self.to)
    }
}

/// A destination that does not start with `/` is external.
pub fn is_external(destination: &str) -> bool {
    !destination.starts_with('/')
}

/// Source pattern, tagged by how it is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "matchType", rename_all = "lowercase")]
pub enum RulePattern {
    /// Literal path equality
    Exact { from: String },
    /// `*` segments capture `(.*)`, anchored at both ends
    Wildcard { from: String },
    /// Full regular expression, unanchored unless the source anchors itself.
    ///
    /// Uses the `regex` crate dialect: no look-around and no backreferences,
    /// so some JavaScript-style expressions are rejected as invalid.
    Regex { from: String },
}

impl RulePattern {
    pub fn source(&self) -> &str {
        match self {
            Self::Exact { from } | Self::Wildcard { from } | Self::Regex { from } => from,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Exact { .. } => MatchType::Exact,
            Self::Wildcard { .. } => MatchType::Wildcard,
            Self::Regex { .. } => MatchType::Regex,
        }
    }
}

/// Pattern matching type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Wildcard,
    Regex,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::Wildcard => "wildcard",
            Self::Regex => "regex",
        };
        f.write_str(name)
    }
}

/// Redirect status code. Only the four redirect codes are representable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    #[default]
    MovedPermanently,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::TemporaryRedirect => 307,
            Self::PermanentRedirect => 308,
        }
    }

    /// Whether clients and caches may treat the move as permanent.
    pub fn is_permanent(self) -> bool {
        matches!(self, Self::MovedPermanently | Self::PermanentRedirect)
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(Self::MovedPermanently),
            302 => Ok(Self::Found),
            307 => Ok(Self::TemporaryRedirect),
            308 => Ok(Self::PermanentRedirect),
            other => Err(format!(
                "unsupported redirect status {other} (expected 301, 302, 307 or 308)"
            )),
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// How the incoming query string is carried onto the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStringHandling {
    /// Append the incoming query to the destination
    #[default]
    Preserve,
    /// Drop the incoming query and strip any query from the destination
    Remove,
    /// Drop the incoming query, leave the destination as authored
    Ignore,
}

impl RedirectConfig {
    /// Build a config with default settings around a rule list.
    pub fn with_rules(rules: Vec<RedirectRule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Parse from YAML (full config or bare rule array).
    ///
    /// The document shape is checked first so that errors come from the
    /// concrete type, with their message and location intact.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let shape: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let config = if shape.is_sequence() {
            Self::with_rules(serde_yaml::from_str(yaml)?)
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.normalized()
    }

    /// Parse from JSON (full config or bare rule array).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let shape: serde_json::Value = serde_json::from_str(json)?;
        let config = if shape.is_array() {
            Self::with_rules(serde_json::from_str(json)?)
        } else {
            serde_json::from_str(json)?
        };
        config.normalized()
    }

    /// Load from disk; `.yaml`/`.yml` are YAML, everything else is JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Fill missing ids and check settings and id uniqueness.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        if self.settings.max_chain_depth == 0 {
            return Err(ConfigError::InvalidSetting(
                "max_chain_depth must be at least 1".to_string(),
            ));
        }

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if rule.id.is_empty() {
                rule.id = format!("rule-{}", index + 1);
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateId(rule.id.clone()));
            }
        }

        Ok(self)
    }

    /// Rules that take part in resolution and chain-following.
    pub fn active_rules(&self) -> impl Iterator<Item = &RedirectRule> {
        self.rules.iter().filter(|r| r.is_active)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
