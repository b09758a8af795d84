//! The Cache external collaborator and the replay cache adapter built on
//! top of it.

use {
    async_trait::async_trait,
    chrono::Duration,
    log::warn,
    lru::LruCache,
    serde_json::Value,
    std::{
        num::NonZeroUsize,
        sync::Mutex,
        time::Instant,
    },
    tower::BoxError,
};

/// `valueForKey` / `setValueForKey` / `removeValueForKey`. Values are
/// JSON-shaped (primitive, array, or object) to match the wire contract
/// exactly; implementations are free to back this with Redis, memcached,
/// or an in-process store.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, BoxError>;
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), BoxError>;
    async fn remove(&self, key: &str) -> Result<(), BoxError>;
}

/// Adapts a [`Cache`] into the replay-specific read-before-verify,
/// write-after-verify protocol.
///
/// Cache errors degrade to "not cached": a failed read lets the request
/// continue to signature verification, and a failed write never fails the
/// request. It only weakens replay protection for that one signature, an
/// accepted race given concurrent requests share the same cache.
pub struct ReplayCacheAdapter<'a, C: Cache + ?Sized> {
    cache: &'a C,
    ttl: Duration,
}

impl<'a, C: Cache + ?Sized> ReplayCacheAdapter<'a, C> {
    pub fn new(cache: &'a C, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(api_key: &str, signature: &str) -> String {
        format!("{api_key}{signature}")
    }

    /// `true` iff this exact (API key, signature) pair was already recorded.
    pub async fn is_replay(&self, api_key: &str, signature: &str) -> bool {
        let key = Self::key(api_key, signature);
        match self.cache.get(&key).await {
            Ok(Some(Value::String(stored))) => stored == signature,
            Ok(_) => false,
            Err(e) => {
                warn!("replay cache read failed, proceeding as not-cached: {e}");
                false
            }
        }
    }

    /// Records `signature` under `(api_key, signature)` with the
    /// configured TTL. Called only after a successful signature
    /// verification.
    pub async fn record(&self, api_key: &str, signature: &str) {
        let key = Self::key(api_key, signature);
        if let Err(e) = self.cache.set(&key, Value::String(signature.to_string()), Some(self.ttl)).await {
            warn!("replay cache write failed (non-fatal): {e}");
        }
    }
}

/// A bundled, in-process reference [`Cache`] over the workspace's `lru`
/// crate. Entries expire lazily: a `get` that finds a past-due entry
/// behaves as a miss and evicts it.
pub struct LruReplayCache {
    inner: Mutex<LruCache<String, (Value, Option<Instant>)>>,
}

impl LruReplayCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Default for LruReplayCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(10_000).unwrap())
    }
}

#[async_trait]
impl Cache for LruReplayCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, BoxError> {
        let mut guard = self.inner.lock().expect("lru cache mutex poisoned");
        let expired = matches!(guard.peek(key), Some((_, Some(expiry))) if Instant::now() > *expiry);
        if expired {
            guard.pop(key);
            return Ok(None);
        }
        Ok(guard.get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), BoxError> {
        let expiry = ttl.and_then(|d| d.to_std().ok()).map(|d| Instant::now() + d);
        self.inner.lock().expect("lru cache mutex poisoned").put(key.to_string(), (value, expiry));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BoxError> {
        self.inner.lock().expect("lru cache mutex poisoned").pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> LruReplayCache {
        LruReplayCache::new(NonZeroUsize::new(16).unwrap())
    }

    #[tokio::test]
    async fn fresh_signature_is_not_a_replay() {
        let cache = cache();
        let adapter = ReplayCacheAdapter::new(&cache, Duration::milliseconds(60_000));
        assert!(!adapter.is_replay("app", "sig").await);
    }

    #[tokio::test]
    async fn recorded_signature_is_a_replay_on_next_check() {
        let cache = cache();
        let adapter = ReplayCacheAdapter::new(&cache, Duration::milliseconds(60_000));
        adapter.record("app", "sig").await;
        assert!(adapter.is_replay("app", "sig").await);
    }

    #[tokio::test]
    async fn different_api_key_or_signature_is_not_a_replay() {
        let cache = cache();
        let adapter = ReplayCacheAdapter::new(&cache, Duration::milliseconds(60_000));
        adapter.record("app", "sig").await;
        assert!(!adapter.is_replay("other-app", "sig").await);
        assert!(!adapter.is_replay("app", "other-sig").await);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = cache();
        let adapter = ReplayCacheAdapter::new(&cache, Duration::milliseconds(1));
        adapter.record("app", "sig").await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!adapter.is_replay("app", "sig").await);
    }
}
