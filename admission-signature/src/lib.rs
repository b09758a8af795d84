//! Canonicalization, HMAC-SHA-256 signature verification, freshness
//! checking, replay rejection, and application authentication: the
//! cryptographic half of the admission pipeline.
//!
//! Plays the role `scratchstack-aws-signature` plays for the scratchstack
//! workspace, generalized from AWS SigV4's multi-part derived-key scheme to
//! this spec's single-secret HMAC scheme.

mod canonical;
mod data_manager;
mod error;
mod freshness;
mod replay;
mod verify;

pub use canonical::{build_canonical_string, canonicalize_body, is_empty_body, sort_keys_recursively, CanonicalRequest};
pub use data_manager::{authenticate, DataManager, InMemoryDataManager};
pub use error::{FreshnessError, SignatureError};
pub use freshness::{check_freshness, parse_http_date, DEFAULT_MAX_REQUEST_AGE};
pub use replay::{Cache, LruReplayCache, ReplayCacheAdapter};
pub use verify::{compute_signature, constant_time_hex_eq, verify};

use chrono::{DateTime, Duration, Utc};

/// Everything the combined "freshness + replay + signature" pipeline step
/// needs to check one request.
pub struct RequestSignature<'a> {
    pub api_key: &'a str,
    pub signature: &'a str,
    pub date_header: Option<&'a str>,
    pub canonical: &'a str,
}

/// Runs freshness, replay, and signature checks in that order: freshness
/// and replay are checked before the signature is verified, since computing
/// it is the most expensive step and a replay hit makes it moot. On
/// success, records the replay entry.
///
/// Returns `Ok(())` on success; any failure is a [`SignatureError`] that the
/// caller maps to `401 invalidRequest`.
pub async fn verify_request(
    cache: &dyn Cache,
    signing_key: &str,
    sig: &RequestSignature<'_>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<(), SignatureError> {
    check_freshness(sig.date_header, now, max_age)?;

    let replay_adapter = ReplayCacheAdapter::new(cache, max_age);
    if replay_adapter.is_replay(sig.api_key, sig.signature).await {
        return Err(SignatureError::Replay);
    }

    if !verify(signing_key, sig.canonical, sig.signature) {
        return Err(SignatureError::Mismatch);
    }

    replay_adapter.record(sig.api_key, sig.signature).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn now() -> DateTime<Utc> {
        parse_http_date("2024-11-10T12:00:00Z").unwrap()
    }

    #[tokio::test]
    async fn s1_like_request_is_accepted() {
        let cache = LruReplayCache::new(NonZeroUsize::new(8).unwrap());
        let canonical = build_canonical_string(
            &CanonicalRequest {
                path_with_query: "/entity/method?message=This%20passed",
                method: "GET",
                nonce: "0123456",
                date: "2024-11-10T12:00:00Z",
            },
            None,
        );
        let signature = compute_signature("test-key", &canonical);
        let sig = RequestSignature {
            api_key: "some-key",
            signature: &signature,
            date_header: Some("2024-11-10T12:00:00Z"),
            canonical: &canonical,
        };
        assert!(verify_request(&cache, "test-key", &sig, now(), DEFAULT_MAX_REQUEST_AGE).await.is_ok());
    }

    #[tokio::test]
    async fn replaying_the_same_signature_is_rejected() {
        let cache = LruReplayCache::new(NonZeroUsize::new(8).unwrap());
        let canonical = "M";
        let signature = compute_signature("test-key", canonical);
        let sig = RequestSignature {
            api_key: "some-key",
            signature: &signature,
            date_header: Some("2024-11-10T12:00:00Z"),
            canonical,
        };
        assert!(verify_request(&cache, "test-key", &sig, now(), DEFAULT_MAX_REQUEST_AGE).await.is_ok());
        let replay = verify_request(&cache, "test-key", &sig, now(), DEFAULT_MAX_REQUEST_AGE).await;
        assert!(matches!(replay, Err(SignatureError::Replay)));
    }

    #[tokio::test]
    async fn stale_timestamp_is_rejected_before_signature_is_checked() {
        let cache = LruReplayCache::new(NonZeroUsize::new(8).unwrap());
        let sig = RequestSignature {
            api_key: "some-key",
            signature: "irrelevant",
            date_header: Some("2024-11-10T11:00:00Z"),
            canonical: "M",
        };
        let result = verify_request(&cache, "test-key", &sig, now(), DEFAULT_MAX_REQUEST_AGE).await;
        assert!(matches!(result, Err(SignatureError::Freshness(_))));
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let cache = LruReplayCache::new(NonZeroUsize::new(8).unwrap());
        let sig = RequestSignature {
            api_key: "some-key",
            signature: "0000000000000000000000000000000000000000000000000000000000000000",
            date_header: Some("2024-11-10T12:00:00Z"),
            canonical: "M",
        };
        let result = verify_request(&cache, "test-key", &sig, now(), DEFAULT_MAX_REQUEST_AGE).await;
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }
}
