//! Request information used for request-time resolution.

/// The parts of an incoming request that redirect rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Request path (without query string)
    pub path: String,
    /// Query string (without leading ?)
    pub query_string: Option<String>,
}

impl RequestInfo {
    /// Split a request target such as `/a/b?x=1#frag` into path and query.
    ///
    /// Fragments are never sent by clients, but are dropped if present.
    pub fn parse(uri: &str) -> Self {
        let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
        match uri.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query_string: Some(query.to_string()),
            },
            None => Self {
                path: uri.to_string(),
                query_string: None,
            },
        }
    }

    /// Incoming query string, if non-empty.
    pub fn query(&self) -> Option<&str> {
        self.query_string.as_deref().filter(|q| !q.is_empty())
    }
}

/// Get status text for a redirect status code.
pub fn status_text(code: u16) -> &'static str {
    match code {
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        _ => "Unknown",
    }
}
