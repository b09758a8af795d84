//! The Admission Pipeline: the fixed nine-step sequence every request is
//! run through before its handler ever sees it.
//!
//! ```text
//! 1. transport guard           (skipped in developer mode)
//! 2. required headers
//! 3. application authentication (skipped in developer mode)
//! 4. freshness + replay + signature (skipped in developer mode)
//! 5. query parameter validation/processing
//! 6. JSON body validation
//! 7. access level evaluation
//! 8. authorization gate
//! 9. handler invocation
//! ```
//!
//! A failure at any step short-circuits the rest. Developer mode skips
//! steps 1, 3, and 4 only; input validation and authorization still run,
//! since those are the caller's own declared contract, not a security
//! boundary against a hostile network.

use {
    crate::{
        endpoint::{Endpoint, EndpointResponse},
        input,
        metrics::{MetricsSink, NoopMetricsSink},
        registry::{EndpointRegistry, RegistrationError},
        request::{IncomingRequest, RequestContext, RequestMeta},
    },
    admission_config::ResolvedConfig,
    admission_errors::{AdmissionError, GatewayError},
    admission_principal::{authorize, evaluate_access_level, AccessLevelEvaluator},
    admission_signature::{authenticate, build_canonical_string, verify_request, Cache, CanonicalRequest, DataManager, RequestSignature},
    chrono::Utc,
    log::error,
    std::{
        future::Future,
        pin::Pin,
        sync::Arc,
        task::{Context, Poll},
        time::Instant,
    },
    tower::Service,
};

fn transport_guard(request: &IncomingRequest) -> Result<(), AdmissionError> {
    let forwarded_https = request
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("https"));
    if !request.is_https && !forwarded_https {
        return Err(AdmissionError::InsecureProtocol);
    }
    Ok(())
}

fn to_chrono_duration(d: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(admission_signature::DEFAULT_MAX_REQUEST_AGE)
}

/// Wires together everything the pipeline needs to run requests against a
/// registered set of endpoints: the registry itself, resolved
/// configuration, the pluggable `DataManager`/`Cache` collaborators, and the
/// application's `AccessLevelEvaluator`.
pub struct Gateway {
    registry: EndpointRegistry,
    config: ResolvedConfig,
    data_manager: Arc<dyn DataManager>,
    cache: Arc<dyn Cache>,
    evaluator: Arc<dyn AccessLevelEvaluator<RequestMeta> + Send + Sync>,
    metrics: Arc<dyn MetricsSink>,
}

impl Gateway {
    /// Fails if the registry has no endpoints registered.
    pub fn new(
        registry: EndpointRegistry,
        config: ResolvedConfig,
        data_manager: Arc<dyn DataManager>,
        cache: Arc<dyn Cache>,
        evaluator: Arc<dyn AccessLevelEvaluator<RequestMeta> + Send + Sync>,
    ) -> Result<Self, RegistrationError> {
        registry.start()?;
        Ok(Self {
            registry,
            config,
            data_manager,
            cache,
            evaluator,
            metrics: Arc::new(NoopMetricsSink),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Runs `request` through the nine-step pipeline against `endpoint`,
    /// which the caller's HTTP transport has already matched by path and
    /// verb.
    pub async fn admit(&self, endpoint: &Endpoint, request: IncomingRequest) -> Result<EndpointResponse, AdmissionError> {
        let started = Instant::now();
        let path = endpoint.canonical_path();
        let verb = endpoint.verb.to_string();

        let result = self.run(endpoint, request).await;

        match &result {
            Ok(_) => self.metrics.admitted(&path, &verb, started.elapsed()),
            Err(e) => self.metrics.rejected(&path, &verb, e.error_id()),
        }
        result
    }

    async fn run(&self, endpoint: &Endpoint, request: IncomingRequest) -> Result<EndpointResponse, AdmissionError> {
        let dev_mode = self.config.developer_mode_enabled();

        if !dev_mode {
            transport_guard(&request)?;
        }

        input::required_headers(&request.headers)?;
        let api_key = input::header_str(&request.headers, "x-api-key").expect("checked by required_headers").to_string();

        let signing_key = if dev_mode {
            String::new()
        } else {
            authenticate(&*self.data_manager, &api_key).await?
        };

        if !dev_mode {
            let signature = input::header_str(&request.headers, "x-signature").expect("checked by required_headers");
            let nonce = input::header_str(&request.headers, "x-signature-nonce").expect("checked by required_headers");
            let date = input::header_str(&request.headers, "date");
            let canonical = build_canonical_string(
                &CanonicalRequest {
                    path_with_query: &request.path_with_query,
                    method: request.method.as_str(),
                    nonce,
                    date: date.unwrap_or_default(),
                },
                request.body.as_ref(),
            );
            let sig = RequestSignature {
                api_key: &api_key,
                signature,
                date_header: date,
                canonical: &canonical,
            };
            verify_request(&*self.cache, &signing_key, &sig, Utc::now(), to_chrono_duration(self.config.max_request_age)).await?;
        }

        let query_parameters = input::process_query_params(endpoint, &request.query)?;
        input::validate_json_body(endpoint, request.body.as_ref())?;

        let meta = RequestMeta {
            api_key,
            method: request.method.clone(),
            path: request.path.clone(),
            headers: request.headers.clone(),
        };
        let owns_resource = || match &endpoint.requestor_owns_resource {
            Some(predicate) => predicate(&meta, &query_parameters, request.body.as_ref()),
            None => false,
        };
        let access_level = evaluate_access_level(&endpoint.characteristics, &*self.evaluator, &meta, owns_resource);

        if !authorize(&endpoint.characteristics, access_level) {
            return Err(AdmissionError::UnauthorizedRequest);
        }

        let ctx = RequestContext {
            meta,
            access_level,
            query_parameters,
            json_body: request.body,
        };

        match endpoint.handler.handle(ctx).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("endpoint handler for {} failed: {e}", endpoint.canonical_path());
                let detail = if dev_mode { e.to_string() } else { "An internal error occurred".to_string() };
                Err(AdmissionError::UnknownError(detail))
            }
        }
    }
}

/// Exposes one registered endpoint's admission pipeline as a
/// [`tower::Service`], so it composes with other Tower middleware (timeouts,
/// load shedding, tracing layers) the way `scratchstack-http-framework`
/// composes services around `scratchstack-aws-signature`'s verification
/// step. [`crate::axum_integration`] drives `Gateway::admit` directly instead
/// of through this type, since axum's own routing already supplies the
/// per-request dispatch a generic `Service` would otherwise need.
#[derive(Clone)]
pub struct AdmissionService {
    gateway: Arc<Gateway>,
    endpoint: Arc<Endpoint>,
}

impl AdmissionService {
    pub fn new(gateway: Arc<Gateway>, endpoint: Arc<Endpoint>) -> Self {
        Self { gateway, endpoint }
    }
}

impl Service<IncomingRequest> for AdmissionService {
    type Response = EndpointResponse;
    type Error = AdmissionError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: IncomingRequest) -> Self::Future {
        let gateway = Arc::clone(&self.gateway);
        let endpoint = Arc::clone(&self.endpoint);
        Box::pin(async move { gateway.admit(&endpoint, request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        endpoint::{Endpoint, FnHandler, Handler},
        verb::Verb,
    };
    use admission_config::Config;
    use admission_principal::{Characteristic, Characteristics, DefaultEvaluator};
    use admission_signature::{compute_signature, InMemoryDataManager, LruReplayCache};
    use http::{HeaderMap, HeaderValue};
    use serde_json::{json, Value};
    use std::{collections::HashMap, num::NonZeroUsize};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    fn signed_request(signing_key: &str, path: &str, api_key: &str) -> IncomingRequest {
        let date = "2024-11-10T12:00:00Z";
        let nonce = "0123456";
        let canonical = build_canonical_string(
            &CanonicalRequest {
                path_with_query: path,
                method: "GET",
                nonce,
                date,
            },
            None,
        );
        let signature = compute_signature(signing_key, &canonical);
        IncomingRequest {
            method: http::Method::GET,
            path_with_query: path.to_string(),
            path: path.to_string(),
            query: HashMap::new(),
            headers: headers(&[
                ("x-api-key", api_key),
                ("date", date),
                ("x-signature", &signature),
                ("x-signature-nonce", nonce),
            ]),
            body: None,
            is_https: true,
        }
    }

    fn public_endpoint() -> Endpoint {
        Endpoint::builder()
            .entity("widgets")
            .method("list")
            .verb(Verb::Get)
            .characteristics(Characteristics::new().with(Characteristic::PublicUnownedData))
            .handler(Arc::new(FnHandler(|_ctx| async { Ok(EndpointResponse::ok(json!({"ok": true}))) })))
            .build()
            .unwrap()
    }

    fn gateway(endpoint: Endpoint, dev_mode: bool) -> Gateway {
        let mut registry = EndpointRegistry::new();
        registry.register(endpoint).unwrap();
        let config = Config {
            max_request_age_ms: None,
            port: Some(8443),
            host: None,
            developer_mode_enabled: dev_mode.then_some(true),
            developer_mode_non_production_marker: dev_mode.then(|| "local-dev".to_string()),
        };
        let resolved = ResolvedConfig::resolve(&config).unwrap();
        Gateway::new(
            registry,
            resolved,
            Arc::new(InMemoryDataManager::new().with_app("api-key", "signing-key")),
            Arc::new(LruReplayCache::new(NonZeroUsize::new(16).unwrap())),
            Arc::new(DefaultEvaluator),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn well_formed_request_is_admitted() {
        let gw = gateway(public_endpoint(), false);
        let request = signed_request("signing-key", "/widgets/list", "api-key");
        let response = gw.admit(gw.registry().endpoints().next().unwrap(), request).await.unwrap();
        assert_eq!(response.data, json!({"ok": true}));
    }

    #[tokio::test]
    async fn admission_service_drives_the_same_pipeline_as_admit() {
        let gw = Arc::new(gateway(public_endpoint(), false));
        let endpoint = Arc::clone(gw.registry().endpoints().next().unwrap());
        let mut service = AdmissionService::new(Arc::clone(&gw), endpoint);

        std::future::poll_fn(|cx| service.poll_ready(cx)).await.unwrap();
        let request = signed_request("signing-key", "/widgets/list", "api-key");
        let response = service.call(request).await.unwrap();
        assert_eq!(response.data, json!({"ok": true}));
    }

    #[tokio::test]
    async fn missing_headers_short_circuit_before_app_auth() {
        let gw = gateway(public_endpoint(), false);
        let request = IncomingRequest {
            method: http::Method::GET,
            path_with_query: "/widgets/list".to_string(),
            path: "/widgets/list".to_string(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: None,
            is_https: true,
        };
        let endpoint = gw.registry().endpoints().next().unwrap();
        let err = gw.admit(endpoint, request).await.unwrap_err();
        assert!(matches!(err, AdmissionError::MissingRequiredHeaders(_)));
    }

    #[tokio::test]
    async fn unknown_api_key_is_unauthorized_app() {
        let gw = gateway(public_endpoint(), false);
        let request = signed_request("signing-key", "/widgets/list", "not-a-real-key");
        let endpoint = gw.registry().endpoints().next().unwrap();
        let err = gw.admit(endpoint, request).await.unwrap_err();
        assert!(matches!(err, AdmissionError::UnauthorizedApp));
    }

    #[tokio::test]
    async fn wrong_signature_is_invalid_request() {
        let gw = gateway(public_endpoint(), false);
        let request = signed_request("wrong-key", "/widgets/list", "api-key");
        let endpoint = gw.registry().endpoints().next().unwrap();
        let err = gw.admit(endpoint, request).await.unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn insecure_transport_is_rejected_outside_developer_mode() {
        let gw = gateway(public_endpoint(), false);
        let mut request = signed_request("signing-key", "/widgets/list", "api-key");
        request.is_https = false;
        let endpoint = gw.registry().endpoints().next().unwrap();
        let err = gw.admit(endpoint, request).await.unwrap_err();
        assert!(matches!(err, AdmissionError::InsecureProtocol));
    }

    #[tokio::test]
    async fn developer_mode_skips_transport_and_signature_checks() {
        let gw = gateway(public_endpoint(), true);
        let request = IncomingRequest {
            method: http::Method::GET,
            path_with_query: "/widgets/list".to_string(),
            path: "/widgets/list".to_string(),
            query: HashMap::new(),
            headers: headers(&[
                ("x-api-key", "anything"),
                ("date", "2024-11-10T12:00:00Z"),
                ("x-signature", "bogus"),
                ("x-signature-nonce", "n"),
            ]),
            body: None,
            is_https: false,
        };
        let endpoint = gw.registry().endpoints().next().unwrap();
        assert!(gw.admit(endpoint, request).await.is_ok());
    }

    #[tokio::test]
    async fn no_characteristics_endpoint_is_always_unauthorized() {
        let endpoint = Endpoint::builder()
            .entity("secret")
            .method("peek")
            .verb(Verb::Get)
            .characteristics(Characteristics::new())
            .handler(Arc::new(FnHandler(|_ctx| async { Ok(EndpointResponse::ok(Value::Null)) })))
            .build()
            .unwrap();
        let gw = gateway(endpoint, true);
        let request = IncomingRequest {
            method: http::Method::GET,
            path_with_query: "/secret/peek".to_string(),
            path: "/secret/peek".to_string(),
            query: HashMap::new(),
            headers: headers(&[
                ("x-api-key", "anything"),
                ("date", "2024-11-10T12:00:00Z"),
                ("x-signature", "bogus"),
                ("x-signature-nonce", "n"),
            ]),
            body: None,
            is_https: false,
        };
        let endpoint = gw.registry().endpoints().next().unwrap();
        let err = gw.admit(endpoint, request).await.unwrap_err();
        assert!(matches!(err, AdmissionError::UnauthorizedRequest));
    }
}
