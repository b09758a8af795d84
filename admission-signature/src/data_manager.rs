//! The Data Manager external collaborator and the application authenticator
//! built on top of it.

use {
    crate::error::SignatureError,
    async_trait::async_trait,
    log::error,
    std::collections::HashMap,
    std::sync::RwLock,
    tower::BoxError,
};

/// `getAppKeyForApiKey(apiKey) -> signingKey | null`. Any exception raised
/// by an implementation must be reported as `UnauthorizedApp`, never
/// surfaced as an internal server error; `authenticate` below does that
/// downgrade for every caller.
#[async_trait]
pub trait DataManager: Send + Sync {
    async fn get_app_key_for_api_key(&self, api_key: &str) -> Result<Option<String>, BoxError>;
}

/// Resolves `api_key` to its signing key, downgrading both "not found" and
/// any Data Manager failure to [`SignatureError::UnknownApiKey`]. The
/// signing key itself is never logged.
pub async fn authenticate(data_manager: &dyn DataManager, api_key: &str) -> Result<String, SignatureError> {
    let result = data_manager.get_app_key_for_api_key(api_key).await;
    match result {
        Ok(Some(signing_key)) if !signing_key.is_empty() => Ok(signing_key),
        Ok(_) => Err(SignatureError::UnknownApiKey),
        Err(e) => {
            error!("data manager lookup failed for api key {api_key}: {e}");
            Err(SignatureError::UnknownApiKey)
        }
    }
}

/// A bundled, in-process reference [`DataManager`] for tests and small
/// deployments. Real deployments back this with their own key store.
#[derive(Default)]
pub struct InMemoryDataManager {
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryDataManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(self, api_key: impl Into<String>, signing_key: impl Into<String>) -> Self {
        self.keys.write().expect("lock poisoned").insert(api_key.into(), signing_key.into());
        self
    }
}

#[async_trait]
impl DataManager for InMemoryDataManager {
    async fn get_app_key_for_api_key(&self, api_key: &str) -> Result<Option<String>, BoxError> {
        Ok(self.keys.read().expect("lock poisoned").get(api_key).cloned())
    }
}
