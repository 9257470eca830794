//! Destination transformers: capture substitution and query string handling.

mod capture;
mod url;

pub use capture::{rewrite, substitute};
pub use url::apply_query;
