//! Query string handling for redirect locations.

use crate::config::QueryStringHandling;

/// Build the final `Location` from a rewritten destination and the incoming
/// query string (without leading `?`).
pub fn apply_query(
    destination: &str,
    incoming_query: Option<&str>,
    handling: QueryStringHandling,
) -> String {
    let (target, fragment) = match destination.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment)),
        None => (destination, None),
    };

    let mut location = match handling {
        QueryStringHandling::Ignore => target.to_string(),
        QueryStringHandling::Remove => target
            .split_once('?')
            .map_or(target, |(path, _)| path)
            .to_string(),
        QueryStringHandling::Preserve => match incoming_query.filter(|q| !q.is_empty()) {
            Some(query) => {
                let separator = if target.contains('?') { '&' } else { '?' };
                format!("{}{}{}", target, separator, query)
            }
            None => target.to_string(),
        },
    };

    if let Some(fragment) = fragment {
        location.push('#');
        location.push_str(fragment);
    }

    location
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserve_appends() {
        let location = apply_query("/new", Some("page=1"), QueryStringHandling::Preserve);
        assert_eq!(location, "/new?page=1");
    }

    #[test]
    fn test_preserve_merges_existing_query() {
        let location = apply_query("/new?src=old", Some("page=1"), QueryStringHandling::Preserve);
        assert_eq!(location, "/new?src=old&page=1");
    }

    #[test]
    fn test_preserve_keeps_fragment_last() {
        let location = apply_query(
            "https://example.com/a#top",
            Some("x=1"),
            QueryStringHandling::Preserve,
        );
        assert_eq!(location, "https://example.com/a?x=1#top");
    }

    #[test]
    fn test_preserve_without_query() {
        assert_eq!(apply_query("/new", None, QueryStringHandling::Preserve), "/new");
        assert_eq!(apply_query("/new", Some(""), QueryStringHandling::Preserve), "/new");
    }

    #[test]
    fn test_ignore_keeps_destination_query() {
        let location = apply_query("/new?src=old", Some("page=1"), QueryStringHandling::Ignore);
        assert_eq!(location, "/new?src=old");
    }

    #[test]
    fn test_remove_strips_all_queries() {
        let location = apply_query("/new?src=old#frag", Some("page=1"), QueryStringHandling::Remove);
        assert_eq!(location, "/new#frag");
    }
}
