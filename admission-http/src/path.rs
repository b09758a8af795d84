//! Canonical path computation for endpoint declarations.
//!
//! Generalizes the legacy signature codebase's multi-slash collapsing
//! (`scratchstack`'s `canonicalize_uri_path`) from signature canonicalization
//! to endpoint registration: an entity and a method segment, possibly
//! already carrying leading/trailing slashes or path-parameter templates
//! (`:id`), are joined and normalized to one canonical form.

use {lazy_static::lazy_static, regex::Regex};

lazy_static! {
    static ref MULTISLASH: Regex = Regex::new("//+").expect("static regex is valid");
}

/// Joins `entity` and `method` into a canonical absolute path: collapses
/// repeated slashes, strips any trailing slash, and guarantees exactly one
/// leading slash. An endpoint with no entity and no method canonicalizes to
/// `"/"`.
pub fn canonical_path(entity: &str, method: &str) -> String {
    let combined = format!("{entity}/{method}");
    let collapsed = MULTISLASH.replace_all(&combined, "/");
    let trimmed = collapsed.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Translates a `:name`-templated path segment into axum 0.8's `{name}`
/// route syntax, for use when mounting endpoints on an axum `Router`.
pub fn to_axum_route(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
