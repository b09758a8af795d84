//! Request shapes that flow through the admission pipeline.

use {crate::params::ParamValue, admission_principal::AccessLevel, http::HeaderMap, serde_json::Value, std::collections::HashMap};

/// Everything about the request an [`admission_principal::AccessLevelEvaluator`]
/// implementation needs to classify the caller. Owns its data so it can
/// outlive the borrowed transport request and be handed to an ownership
/// predicate alongside the evaluator.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub api_key: String,
    pub method: http::Method,
    pub path: String,
    pub headers: HeaderMap,
}

/// Transport-agnostic view of an inbound request, produced by whatever HTTP
/// framework integration sits in front of the pipeline.
pub struct IncomingRequest {
    pub method: http::Method,
    pub path_with_query: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub is_https: bool,
}

/// What an endpoint's handler actually receives: the caller's resolved
/// access level, the validated and typed query parameters, and the parsed
/// JSON body, if any.
pub struct RequestContext {
    pub meta: RequestMeta,
    pub access_level: AccessLevel,
    pub query_parameters: HashMap<String, ParamValue>,
    pub json_body: Option<Value>,
}

impl RequestContext {
    pub fn query(&self, name: &str) -> Option<&ParamValue> {
        self.query_parameters.get(name)
    }
}
