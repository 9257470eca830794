//! Capture-group rewriting of destinations.

use crate::config::{RedirectRule, RulePattern};
use crate::matcher::PathMatcher;

/// Rewrite `rule.to` using the groups `rule.from` captures from `path`.
///
/// Exact rules, non-matching paths and uncompilable patterns all return
/// `rule.to` unchanged.
pub fn rewrite(path: &str, rule: &RedirectRule) -> String {
    if matches!(rule.pattern, RulePattern::Exact { .. }) {
        return rule.to.clone();
    }

    let Ok(matcher) = PathMatcher::compile(rule) else {
        return rule.to.clone();
    };

    let result = matcher.matches(path);
    if !result.matched {
        return rule.to.clone();
    }

    substitute(&rule.to, &result.captures)
}

/// Replace `$1`..`$n` in `template` with positional captures.
///
/// A digit run after `$` takes the longest prefix naming an existing group,
/// so `$10` is group 10 when there are ten groups and group 1 followed by `0`
/// otherwise. References to missing groups are left as written. Substituted
/// text is never re-scanned.
pub fn substitute(template: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        let group = (1..=digits).rev().find_map(|len| {
            let index: usize = after[..len].parse().ok()?;
            let value = captures.get(index.checked_sub(1)?)?;
            Some((len, value))
        });

        match group {
            Some((len, value)) => {
                out.push_str(value);
                rest = &after[len..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_rewrite() {
        let rule = RedirectRule::wildcard("r", "/blog/*", "/articles/$1");
        assert_eq!(rewrite("/blog/my-post", &rule), "/articles/my-post");
    }

    #[test]
    fn test_regex_rewrite() {
        let rule = RedirectRule::regex("r", r"^/product/(\d+)$", "/products/$1");
        assert_eq!(rewrite("/product/42", &rule), "/products/42");
    }

    #[test]
    fn test_repeated_placeholder() {
        let rule = RedirectRule::wildcard("r", "/tag/*", "/search?q=$1&tag=$1");
        assert_eq!(rewrite("/tag/rust", &rule), "/search?q=rust&tag=rust");
    }

    #[test]
    fn test_exact_is_verbatim() {
        let rule = RedirectRule::exact("r", "/a", "/b/$1");
        assert_eq!(rewrite("/a", &rule), "/b/$1");
    }

    #[test]
    fn test_no_match_is_verbatim() {
        let rule = RedirectRule::wildcard("r", "/blog/*", "/articles/$1");
        assert_eq!(rewrite("/news/x", &rule), "/articles/$1");
    }

    #[test]
    fn test_bad_regex_is_verbatim() {
        let rule = RedirectRule::regex("r", "(unclosed", "/x/$1");
        assert_eq!(rewrite("/anything", &rule), "/x/$1");
    }

    #[test]
    fn test_substitute_multi_digit() {
        let ten = caps(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        assert_eq!(substitute("/$10/$1", &ten), "/j/a");

        let two = caps(&["a", "b"]);
        assert_eq!(substitute("/$10/$2", &two), "/a0/b");
    }

    #[test]
    fn test_substitute_leaves_unknown_refs() {
        let one = caps(&["a"]);
        assert_eq!(substitute("/$0/$2/$/$x", &one), "/$0/$2/$/$x");
    }

    #[test]
    fn test_substitute_does_not_rescan() {
        let values = caps(&["$2", "b"]);
        assert_eq!(substitute("/$1", &values), "/$2");
    }
}
