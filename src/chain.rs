//! Redirect loop and chain detection.
//!
//! Starting from a rule's destination, repeatedly look up the next active
//! rule whose pattern matches the current path and follow it. The walk is a
//! bounded iteration: it stops at an external destination, at a dead end, at
//! a revisited path (a loop), or after `max_depth` hops (treated as a loop).
//!
//! The next hop is the first structural match in input order, not the
//! priority-sorted winner used at request time. This reports a loop whenever
//! any matching rule could close one.

use crate::config::{is_external, RedirectRule};
use crate::matcher::{compile_active, CompiledRule};
use serde::Serialize;
use std::collections::HashSet;

/// Default hop bound for chain-following.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Outcome of following a rule's destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopReport {
    /// Whether the chain revisits a path or exceeds the hop bound
    pub has_loop: bool,
    /// Origin pattern followed by every destination reached
    pub chain: Vec<String>,
}

impl LoopReport {
    fn terminated(chain: Vec<String>) -> Self {
        Self {
            has_loop: false,
            chain,
        }
    }

    fn looped(chain: Vec<String>) -> Self {
        Self {
            has_loop: true,
            chain,
        }
    }

    /// Chain rendered as `/a → /b → /c`.
    pub fn display_chain(&self) -> String {
        self.chain.join(" → ")
    }
}

/// Follow `rule` through `rules` looking for loops and long chains.
pub fn detect_loop(rule: &RedirectRule, rules: &[RedirectRule], max_depth: usize) -> LoopReport {
    detect_loop_compiled(rule, &compile_active(rules), max_depth)
}

/// Follow `rule` through rules compiled by [`compile_active`].
///
/// Batch callers compile the rule set once and reuse it for every rule.
pub fn detect_loop_compiled(
    rule: &RedirectRule,
    compiled: &[CompiledRule],
    max_depth: usize,
) -> LoopReport {
    let mut chain = vec![rule.from().to_string()];
    let mut visited: HashSet<String> = HashSet::from([rule.from().to_string()]);
    let mut current = rule.to.clone();

    if is_external(&current) {
        chain.push(current);
        return LoopReport::terminated(chain);
    }

    for _ in 0..max_depth {
        if visited.contains(&current) {
            chain.push(current);
            return LoopReport::looped(chain);
        }

        visited.insert(current.clone());
        chain.push(current.clone());

        let next = compiled
            .iter()
            .filter(|c| c.rule.is_active && c.rule.id != rule.id)
            .find(|c| c.is_match(&current))
            .map(|c| &c.rule);

        let Some(next) = next else {
            return LoopReport::terminated(chain);
        };

        if next.is_external() {
            chain.push(next.to.clone());
            return LoopReport::terminated(chain);
        }

        current = next.to.clone();
    }

    LoopReport::looped(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_cycle() {
        let rules = vec![
            RedirectRule::exact("a", "/a", "/b"),
            RedirectRule::exact("b", "/b", "/a"),
        ];

        for rule in &rules {
            let report = detect_loop(rule, &rules, DEFAULT_MAX_DEPTH);
            assert!(report.has_loop);
            assert!(report.chain.len() >= 3);
            let last = report.chain.last().unwrap();
            assert!(report.chain[..report.chain.len() - 1].contains(last));
        }

        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert_eq!(report.chain, vec!["/a", "/b", "/a"]);
        assert_eq!(report.display_chain(), "/a → /b → /a");
    }

    #[test]
    fn test_self_loop() {
        let rule = RedirectRule::exact("a", "/a", "/a");
        let report = detect_loop(&rule, std::slice::from_ref(&rule), DEFAULT_MAX_DEPTH);
        assert!(report.has_loop);
        assert_eq!(report.chain, vec!["/a", "/a"]);
    }

    #[test]
    fn test_external_destination() {
        let rule = RedirectRule::exact("a", "/a", "https://example.com");
        let report = detect_loop(&rule, std::slice::from_ref(&rule), DEFAULT_MAX_DEPTH);
        assert!(!report.has_loop);
        assert_eq!(report.chain, vec!["/a", "https://example.com"]);
    }

    #[test]
    fn test_chain_ends_at_external_hop() {
        let rules = vec![
            RedirectRule::exact("a", "/a", "/b"),
            RedirectRule::exact("b", "/b", "https://example.com/b"),
        ];
        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert!(!report.has_loop);
        assert_eq!(report.chain, vec!["/a", "/b", "https://example.com/b"]);
    }

    #[test]
    fn test_dead_end() {
        let rules = vec![
            RedirectRule::exact("a", "/a", "/b"),
            RedirectRule::exact("b", "/b", "/c"),
        ];
        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert!(!report.has_loop);
        assert_eq!(report.chain, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_inactive_rules_invisible() {
        let rules = vec![
            RedirectRule::exact("a", "/a", "/b"),
            RedirectRule::exact("b", "/b", "/a").inactive(),
        ];
        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert!(!report.has_loop);
        assert_eq!(report.chain, vec!["/a", "/b"]);
    }

    #[test]
    fn test_depth_exhaustion_is_loop() {
        let rules: Vec<_> = (0..20)
            .map(|i| RedirectRule::exact(format!("r{i}"), format!("/p{i}"), format!("/p{}", i + 1)))
            .collect();

        let report = detect_loop(&rules[0], &rules, 5);
        assert!(report.has_loop);
        assert_eq!(report.chain.len(), 6);

        let report = detect_loop(&rules[0], &rules, 30);
        assert!(!report.has_loop);
    }

    #[test]
    fn test_follows_wildcard_hops() {
        let rules = vec![
            RedirectRule::exact("a", "/old", "/blog/post"),
            RedirectRule::wildcard("b", "/blog/*", "/old"),
        ];
        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert!(report.has_loop);
        assert_eq!(report.chain, vec!["/old", "/blog/post", "/old"]);
    }

    #[test]
    fn test_compiled_walk_matches_free_function() {
        let rules = vec![
            RedirectRule::exact("a", "/start", "/blog/x"),
            RedirectRule::wildcard("b", "/blog/*", "/news/$1"),
            RedirectRule::regex("c", "^/news/", "/start"),
            RedirectRule::regex("bad", "(unclosed", "/start"),
        ];
        let compiled = compile_active(&rules);

        for rule in &rules {
            assert_eq!(
                detect_loop_compiled(rule, &compiled, DEFAULT_MAX_DEPTH),
                detect_loop(rule, &rules, DEFAULT_MAX_DEPTH)
            );
        }
    }

    #[test]
    fn test_uses_input_order_not_priority() {
        let rules = vec![
            RedirectRule::exact("start", "/start", "/mid"),
            RedirectRule::exact("back", "/mid", "/start").with_priority(0),
            RedirectRule::exact("out", "/mid", "/done").with_priority(10),
        ];
        let report = detect_loop(&rules[0], &rules, DEFAULT_MAX_DEPTH);
        assert!(report.has_loop);
    }
}
