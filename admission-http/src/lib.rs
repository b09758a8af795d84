//! Endpoint declaration, the Input Validator, and the Admission Pipeline
//! orchestrator: the part of the system that ties `admission-principal`'s
//! access-level lattice and `admission-signature`'s request verification
//! together into something an HTTP framework can mount.
//!
//! Plays the role `scratchstack-http-framework` plays for the scratchstack
//! workspace: a thin, framework-specific shell (here, `axum`) around
//! transport-agnostic pipeline logic that the rest of this crate owns.

#[cfg(feature = "axum")]
mod axum_integration;
mod endpoint;
mod input;
mod metrics;
mod params;
mod path;
mod pipeline;
mod registry;
mod request;
mod verb;

#[cfg(feature = "axum")]
pub use axum_integration::{build_router, build_router_behind_proxy, error_response};
pub use endpoint::{BodyValidator, Endpoint, EndpointBuilder, EndpointResponse, FnHandler, Handler, OwnsResourceFn};
pub use input::{header_str, process_query_params, required_headers, validate_json_body, REQUIRED_HEADERS};
pub use metrics::{MetricsSink, NoopMetricsSink};
pub use params::{AnyValue, Identity, IntegerOnly, ParamProcessor, ParamValidator, ParamValue, ParseInteger, QueryParamDescriptor};
pub use path::{canonical_path, to_axum_route};
pub use pipeline::{AdmissionService, Gateway};
pub use registry::{EndpointRegistry, RegistrationError};
pub use request::{IncomingRequest, RequestContext, RequestMeta};
pub use verb::Verb;
