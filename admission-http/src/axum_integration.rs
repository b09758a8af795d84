//! Mounts a [`crate::pipeline::Gateway`]'s registered endpoints onto an
//! [`axum::Router`]. HTTP transport and routing are assumed collaborators
//! supplied by the embedder, not a pipeline responsibility; this module is
//! that collaborator for axum specifically.

use {
    crate::{
        endpoint::{Endpoint, EndpointResponse},
        path::to_axum_route,
        pipeline::Gateway,
        request::IncomingRequest,
    },
    admission_errors::{AdmissionError, ErrorEnvelope, GatewayError},
    axum::{
        body::to_bytes,
        response::{IntoResponse, Response},
        routing::{any, delete, get, patch, post, put, MethodRouter},
        Json, Router,
    },
    log::warn,
    serde_json::Value,
    std::{collections::HashMap, sync::Arc},
};

use crate::verb::Verb;

const MAX_BODY_BYTES: usize = 1024 * 1024;

impl IntoResponse for EndpointResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.data)).into_response()
    }
}

/// Serializes a rejection as the wire-contract error envelope at its
/// mapped status code.
pub fn error_response(err: &AdmissionError) -> Response {
    (err.http_status(), Json(ErrorEnvelope::from_error(err))).into_response()
}

async fn to_incoming_request(request: axum::extract::Request, is_https: bool) -> Result<IncomingRequest, Response> {
    let (parts, body) = request.into_parts();
    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let path_with_query = match parts.uri.query() {
        Some(q) => format!("{}?{}", parts.uri.path(), q),
        None => parts.uri.path().to_string(),
    };

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Err(error_response(&AdmissionError::InvalidJsonBody));
        }
    };

    let json_body: Option<Value> = if bytes.is_empty() {
        None
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(_) => return Err(error_response(&AdmissionError::InvalidJsonBody)),
        }
    };

    Ok(IncomingRequest {
        method: parts.method,
        path_with_query,
        path: parts.uri.path().to_string(),
        query,
        headers: parts.headers,
        body: json_body,
        is_https,
    })
}

/// Whether to trust `X-Forwarded-Proto` at all is deployment-specific:
/// [`build_router`] assumes the connection itself is HTTPS (TLS terminated
/// in-process), while [`build_router_behind_proxy`] trusts the header
/// instead, for deployments that terminate TLS at a trusted reverse proxy.
async fn dispatch(gateway: Arc<Gateway>, endpoint: Arc<Endpoint>, assume_https: bool, request: axum::extract::Request) -> Response {
    let is_https = assume_https
        || request
            .headers()
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("https"));
    match to_incoming_request(request, is_https).await {
        Ok(incoming) => match gateway.admit(&endpoint, incoming).await {
            Ok(response) => response.into_response(),
            Err(err) => error_response(&err),
        },
        Err(response) => response,
    }
}

fn method_router(verb: Verb, gateway: Arc<Gateway>, endpoint: Arc<Endpoint>, assume_https: bool) -> MethodRouter {
    let handler = move |request: axum::extract::Request| {
        let gateway = Arc::clone(&gateway);
        let endpoint = Arc::clone(&endpoint);
        async move { dispatch(gateway, endpoint, assume_https, request).await }
    };
    match verb {
        Verb::Get => get(handler),
        Verb::All => any(handler),
        Verb::Post => post(handler),
        Verb::Put => put(handler),
        Verb::Patch => patch(handler),
        Verb::Delete => delete(handler),
    }
}

/// Builds an [`axum::Router`] mounting every endpoint in `gateway`'s
/// registry at its canonical path (translated to axum's `{name}` template
/// syntax), treating the connection itself as HTTPS. Suitable behind TLS
/// termination that occurs inside this process.
pub fn build_router(gateway: Arc<Gateway>) -> Router {
    build_router_inner(gateway, true)
}

/// As [`build_router`], but trusts `X-Forwarded-Proto` instead of assuming
/// HTTPS, for deployments that terminate TLS at a trusted reverse proxy.
pub fn build_router_behind_proxy(gateway: Arc<Gateway>) -> Router {
    build_router_inner(gateway, false)
}

fn build_router_inner(gateway: Arc<Gateway>, assume_https: bool) -> Router {
    let mut router = Router::new();
    for endpoint in gateway.registry().endpoints() {
        let route = to_axum_route(&endpoint.canonical_path());
        router = router.route(&route, method_router(endpoint.verb, Arc::clone(&gateway), Arc::clone(endpoint), assume_https));
    }
    router
}
