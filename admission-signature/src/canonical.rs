//! The canonicalizer. Produces the exact byte string `M` that is
//! HMAC-signed by both client and server.

use {
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    serde_json::{Map, Value},
};

/// The four client-supplied fields plus the query-qualified path that make
/// up a canonical string, short of the body.
pub struct CanonicalRequest<'a> {
    /// Original request path plus raw query string (client byte ordering
    /// preserved), no fragment.
    pub path_with_query: &'a str,
    pub method: &'a str,
    pub nonce: &'a str,
    pub date: &'a str,
}

/// Recursively sorts the keys of every nested JSON object. Arrays keep
/// their element order; non-object leaves are untouched.
pub fn sort_keys_recursively(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys_recursively(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys_recursively).collect()),
        other => other.clone(),
    }
}

/// `true` iff the body is absent, `null`, or an empty JSON object: the
/// three cases that canonicalize to the empty string.
pub fn is_empty_body(body: Option<&Value>) -> bool {
    match body {
        None => true,
        Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// The base64-encoded, key-sorted, whitespace-free JSON body segment, or
/// the empty string for an absent/empty body.
pub fn canonicalize_body(body: Option<&Value>) -> String {
    if is_empty_body(body) {
        return String::new();
    }
    let sorted = sort_keys_recursively(body.expect("checked non-empty above"));
    let compact = serde_json::to_string(&sorted).expect("serde_json::Value always serializes");
    BASE64.encode(compact.as_bytes())
}

/// Builds `M = path_with_query || "." || VERB || "." || nonce || "." ||
/// date || "." || body_canonical`.
pub fn build_canonical_string(req: &CanonicalRequest<'_>, body: Option<&Value>) -> String {
    let verb = req.method.to_ascii_uppercase();
    let body_canonical = canonicalize_body(body);
    format!("{}.{}.{}.{}.{}", req.path_with_query, verb, req.nonce, req.date, body_canonical)
}
