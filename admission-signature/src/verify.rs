//! The signature verifier. HMAC-SHA-256 over the canonical string,
//! lowercase hex, constant-time compare.

use {
    hmac::{Hmac, Mac},
    log::debug,
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase-hex HMAC-SHA-256 digest of `canonical` under
/// `signing_key`. An empty signing key is rejected by the caller before
/// this is invoked, since an empty key means the key lookup returned
/// nothing.
pub fn compute_signature(signing_key: &str, canonical: &str) -> String {
    // HMAC accepts keys of any length (short keys are zero-padded per the
    // spec), so `new_from_slice` cannot fail here.
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes()).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of two lowercase hex digests. Returns `false`
/// (never panics) on length mismatch rather than leaking timing on it;
/// digest length is fixed and public, so this costs nothing.
pub fn constant_time_hex_eq(expected: &str, provided: &str) -> bool {
    if expected.len() != provided.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// `true` iff `provided` is the correct signature of `canonical` under
/// `signing_key`.
pub fn verify(signing_key: &str, canonical: &str, provided: &str) -> bool {
    if signing_key.is_empty() {
        return false;
    }
    let expected = compute_signature(signing_key, canonical);
    debug!("computed signature {expected} for canonical string of {} bytes", canonical.len());
    constant_time_hex_eq(&expected, provided)
}
