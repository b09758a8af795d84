//! Endpoint declaration: what an application registers with the gateway.
//! Its path, verb, sensitivity characteristics, query parameters, body
//! shape, ownership predicate, and handler.

use {
    crate::{params::QueryParamDescriptor, request::RequestContext, verb::Verb},
    admission_principal::Characteristics,
    async_trait::async_trait,
    derive_builder::Builder,
    http::StatusCode,
    serde_json::Value,
    std::{future::Future, sync::Arc},
    tower::BoxError,
};

/// What a handler returns on success: a status code (defaulting to 200) and
/// a JSON body the framework integration serializes.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: StatusCode,
    pub data: Value,
}

impl EndpointResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    pub fn with_status(status: StatusCode, data: Value) -> Self {
        Self { status, data }
    }
}

/// The application logic behind one endpoint, run only after every
/// admission pipeline step has passed. Errors raised here are caught by the
/// pipeline and reported as `unknownError`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: RequestContext) -> Result<EndpointResponse, BoxError>;
}

/// Adapts an `async fn(RequestContext) -> Result<EndpointResponse, BoxError>`
/// closure into a [`Handler`], for applications that don't need a dedicated
/// type per endpoint.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<EndpointResponse, BoxError>> + Send + 'static,
{
    async fn handle(&self, ctx: RequestContext) -> Result<EndpointResponse, BoxError> {
        (self.0)(ctx).await
    }
}

/// `true` iff `body` is an acceptable shape for this endpoint. Runs only
/// when a body is actually present; a missing-but-required body is
/// `missingJsonBody`, never routed through this trait.
pub trait BodyValidator: Send + Sync {
    fn is_valid(&self, body: &Value) -> bool;
}

/// `(meta, query_parameters, body) -> bool`: does the caller own the
/// resource this request targets? Required at registration time for any
/// endpoint declaring `PrivateOwnedData` or `PublicOwnedData`.
pub type OwnsResourceFn = Arc<
    dyn Fn(&crate::request::RequestMeta, &std::collections::HashMap<String, crate::params::ParamValue>, Option<&Value>) -> bool
        + Send
        + Sync,
>;

/// One declared endpoint: entity/method path fragments, verb, sensitivity
/// characteristics, and the validation/authorization/handling machinery the
/// pipeline drives it through.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Endpoint {
    /// Resource-level path fragment, e.g. `"widgets"`.
    #[builder(default, setter(into))]
    pub entity: String,

    /// Operation-level path fragment, possibly templated (`:id`), e.g.
    /// `"get/:id"`.
    #[builder(default, setter(into))]
    pub method: String,

    pub verb: Verb,

    pub characteristics: Characteristics,

    #[builder(default)]
    pub query_params: Vec<QueryParamDescriptor>,

    #[builder(default, setter(strip_option))]
    pub body_validator: Option<Arc<dyn BodyValidator>>,

    #[builder(default)]
    pub json_body_required: bool,

    #[builder(default, setter(strip_option))]
    pub requestor_owns_resource: Option<OwnsResourceFn>,

    pub handler: Arc<dyn Handler>,
}

impl Endpoint {
    pub fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }

    pub fn canonical_path(&self) -> String {
        crate::path::canonical_path(&self.entity, &self.method)
    }
}
