//! URL redirect rule engine.
//!
//! Decides, for a request path and a rule set, which redirect applies and
//! where it points, and checks a rule set for consistency before it is
//! published:
//!
//! - Exact, wildcard (`*`) and regex matching
//! - `$1`..`$n` capture substitution in destinations
//! - Priority/order based resolution
//! - Loop and long-chain detection
//! - Per-rule and batch validation with errors and warnings
//!
//! Every operation is a pure function of its inputs. [`RedirectEngine`]
//! precompiles a rule set for request-time use.
//!
//! ## Configuration Example
//!
//! ```yaml
//! settings:
//!   max_chain_depth: 10
//! rules:
//!   - id: "blog-move"
//!     from: "/blog/*"
//!     to: "/articles/$1"
//!     matchType: wildcard
//!     statusCode: 301
//! ```

pub mod chain;
pub mod config;
pub mod context;
pub mod engine;
pub mod matcher;
pub mod resolver;
pub mod transformer;
pub mod validator;

pub use chain::{detect_loop, LoopReport, DEFAULT_MAX_DEPTH};
pub use config::{
    ConfigError, MatchType, QueryStringHandling, RedirectConfig, RedirectRule, RedirectStatus,
    RulePattern, Settings,
};
pub use context::RequestInfo;
pub use engine::{EngineError, Redirect, RedirectEngine};
pub use matcher::{matches, MatcherError};
pub use resolver::resolve;
pub use transformer::rewrite;
pub use validator::{
    validate, validate_all, validate_all_with, validate_with, Diagnostic, ValidationResult,
    ValidationSummary,
};
