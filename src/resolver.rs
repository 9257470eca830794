//! Rule resolution: pick the single winning rule for a path.

use crate::config::RedirectRule;
use crate::matcher::matches;
use std::cmp::Reverse;

/// Active rules in evaluation order: priority descending, then `order`
/// ascending, then input position.
pub fn evaluation_order(rules: &[RedirectRule]) -> Vec<&RedirectRule> {
    let mut active: Vec<&RedirectRule> = rules.iter().filter(|r| r.is_active).collect();
    // Stable sort keeps input position as the final tie-breaker.
    active.sort_by_key(|r| (Reverse(r.priority), r.order));
    active
}

/// Find the highest-ranked active rule matching `path`.
pub fn resolve<'a>(path: &str, rules: &'a [RedirectRule]) -> Option<&'a RedirectRule> {
    evaluation_order(rules)
        .into_iter()
        .find(|rule| matches(path, rule))
}
