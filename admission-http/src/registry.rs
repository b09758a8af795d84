//! The Endpoint Registry: collects declared endpoints, enforces
//! `(path, verb)` uniqueness and the owned-data-requires-ownership-predicate
//! invariant, and refuses to start with nothing registered.

use {
    crate::{endpoint::Endpoint, verb::Verb},
    std::{
        collections::HashMap,
        error::Error as StdError,
        fmt::{Display, Formatter, Result as FmtResult},
        sync::Arc,
    },
};

#[derive(Debug)]
pub enum RegistrationError {
    /// An endpoint already exists for this exact canonical path and verb.
    DuplicateEndpoint(String, Verb),
    /// An endpoint declares `PrivateOwnedData` or `PublicOwnedData` without
    /// supplying a `requestor_owns_resource` predicate.
    MissingOwnershipPredicate(String),
    /// `start()` was called with no endpoints registered.
    NoEndpointsRegistered,
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::DuplicateEndpoint(path, verb) => write!(f, "Duplicate endpoint registration for {verb} {path}"),
            Self::MissingOwnershipPredicate(path) => {
                write!(f, "Endpoint {path} declares an owned-data characteristic but has no ownership predicate")
            }
            Self::NoEndpointsRegistered => write!(f, "Cannot start a gateway with no endpoints registered"),
        }
    }
}

impl StdError for RegistrationError {}

/// Holds every declared [`Endpoint`], keyed by its canonical `(path, verb)`.
/// Routing itself, matching an inbound request to one of these records, is
/// left to the HTTP transport; this registry only enforces the
/// declaration-time invariants and hands the framework integration the
/// finished set to mount.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<Endpoint>>,
    index: HashMap<(String, Verb), usize>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the endpoint's canonical path, rejects a duplicate
    /// `(path, verb)` pair, rejects an owned-data endpoint with no
    /// ownership predicate, and stores the record.
    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), RegistrationError> {
        let path = endpoint.canonical_path();

        if endpoint.characteristics.requires_ownership_predicate() && endpoint.requestor_owns_resource.is_none() {
            return Err(RegistrationError::MissingOwnershipPredicate(path));
        }

        let key = (path.clone(), endpoint.verb);
        if self.index.contains_key(&key) {
            return Err(RegistrationError::DuplicateEndpoint(path, endpoint.verb));
        }

        self.index.insert(key, self.endpoints.len());
        self.endpoints.push(Arc::new(endpoint));
        Ok(())
    }

    /// Validates the registry is ready to serve traffic. Currently that
    /// means only "at least one endpoint is registered"; port/host
    /// validity is `admission_config::ResolvedConfig`'s responsibility.
    pub fn start(&self) -> Result<(), RegistrationError> {
        if self.endpoints.is_empty() {
            return Err(RegistrationError::NoEndpointsRegistered);
        }
        Ok(())
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpoint, EndpointResponse, FnHandler, Handler};
    use admission_principal::{Characteristic, Characteristics};
    use serde_json::Value;
    use std::sync::Arc;

    fn noop_handler() -> Arc<dyn Handler> {
        Arc::new(FnHandler(|_ctx| async { Ok(EndpointResponse::ok(Value::Null)) }))
    }

    fn public_endpoint(entity: &str, method: &str, verb: Verb) -> Endpoint {
        Endpoint::builder()
            .entity(entity)
            .method(method)
            .verb(verb)
            .characteristics(Characteristics::new().with(Characteristic::PublicUnownedData))
            .handler(noop_handler())
            .build()
            .unwrap()
    }

    #[test]
    fn registers_a_unique_endpoint() {
        let mut registry = EndpointRegistry::new();
        registry.register(public_endpoint("widgets", "list", Verb::Get)).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.start().is_ok());
    }

    #[test]
    fn rejects_duplicate_path_and_verb() {
        let mut registry = EndpointRegistry::new();
        registry.register(public_endpoint("widgets", "list", Verb::Get)).unwrap();
        let err = registry.register(public_endpoint("widgets", "list", Verb::Get)).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEndpoint(_, Verb::Get)));
    }

    #[test]
    fn same_path_different_verb_is_allowed() {
        let mut registry = EndpointRegistry::new();
        registry.register(public_endpoint("widgets", "list", Verb::Get)).unwrap();
        registry.register(public_endpoint("widgets", "list", Verb::Post)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn owned_data_without_predicate_is_rejected() {
        let mut registry = EndpointRegistry::new();
        let endpoint = Endpoint::builder()
            .entity("widgets")
            .method("get/:id")
            .verb(Verb::Get)
            .characteristics(Characteristics::new().with(Characteristic::PrivateOwnedData))
            .handler(noop_handler())
            .build()
            .unwrap();
        assert!(matches!(registry.register(endpoint), Err(RegistrationError::MissingOwnershipPredicate(_))));
    }

    #[test]
    fn owned_data_with_predicate_registers_fine() {
        let mut registry = EndpointRegistry::new();
        let endpoint = Endpoint::builder()
            .entity("widgets")
            .method("get/:id")
            .verb(Verb::Get)
            .characteristics(Characteristics::new().with(Characteristic::PrivateOwnedData))
            .requestor_owns_resource(Arc::new(|_meta, _query, _body| true))
            .handler(noop_handler())
            .build()
            .unwrap();
        assert!(registry.register(endpoint).is_ok());
    }

    #[test]
    fn start_refuses_an_empty_registry() {
        let registry = EndpointRegistry::new();
        assert!(matches!(registry.start(), Err(RegistrationError::NoEndpointsRegistered)));
    }
}
