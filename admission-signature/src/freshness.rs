//! The freshness checker. The only correct computation is an absolute "now
//! minus parsed client timestamp" in milliseconds since the epoch; a legacy
//! "UTC milliseconds-of-second" computation some ancestors of this codebase
//! used is a bug and is not reproduced here.

use {
    crate::error::FreshnessError,
    chrono::{DateTime, Duration, Utc},
};

/// Default freshness window: the `maxRequestAge` default.
pub const DEFAULT_MAX_REQUEST_AGE: Duration = Duration::milliseconds(60_000);

/// Parses an HTTP `Date` header value. Accepts RFC 2822 (the wire format of
/// an actual `Date:` header), RFC 3339 (used throughout this spec's worked
/// examples, e.g. `2024-11-10T12:00:00Z`), and the IMF-fixdate form
/// (`Tue, 10 Nov 2024 12:00:00 GMT`) since real HTTP clients send all three
/// in the wild.
pub fn parse_http_date(raw: &str) -> Result<DateTime<Utc>, FreshnessError> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S GMT") {
        return Ok(dt.with_timezone(&Utc));
    }
    Err(FreshnessError::UnparseableDate(raw.to_string()))
}

/// Validates that `raw` parses and falls within `[now - max_age, now]`.
///
/// Rejects `diff < 0` (timestamp in the future) or `diff > max_age`
/// (stale). `now` is threaded in explicitly so this stays a pure function
/// independently testable without touching the wall clock.
pub fn check_freshness(raw: Option<&str>, now: DateTime<Utc>, max_age: Duration) -> Result<(), FreshnessError> {
    let raw = raw.ok_or(FreshnessError::MissingDateHeader)?;
    let parsed = parse_http_date(raw)?;
    let diff = now - parsed;
    if diff < Duration::zero() || diff > max_age {
        return Err(FreshnessError::OutOfWindow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_dates_from_the_spec_examples() {
        let parsed = parse_http_date("2024-11-10T12:00:00Z").unwrap();
        assert_eq!(parsed, at(2024, 11, 10, 12, 0, 0));
    }

    #[test]
    fn parses_imf_fixdate() {
        let parsed = parse_http_date("Sun, 10 Nov 2024 12:00:00 GMT").unwrap();
        assert_eq!(parsed, at(2024, 11, 10, 12, 0, 0));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(check_freshness(None, at(2024, 1, 1, 0, 0, 0), DEFAULT_MAX_REQUEST_AGE), Err(FreshnessError::MissingDateHeader)));
    }

    #[test]
    fn within_window_is_accepted() {
        let client = at(2024, 11, 10, 12, 0, 0);
        let server_now = client + Duration::milliseconds(59_999);
        assert!(check_freshness(Some("2024-11-10T12:00:00Z"), server_now, DEFAULT_MAX_REQUEST_AGE).is_ok());
    }

    #[test]
    fn exactly_at_the_window_edge_is_accepted() {
        let client = at(2024, 11, 10, 12, 0, 0);
        let server_now = client + DEFAULT_MAX_REQUEST_AGE;
        assert!(check_freshness(Some("2024-11-10T12:00:00Z"), server_now, DEFAULT_MAX_REQUEST_AGE).is_ok());
    }

    #[test]
    fn one_millisecond_past_the_window_is_stale() {
        let client = at(2024, 11, 10, 12, 0, 0);
        let server_now = client + DEFAULT_MAX_REQUEST_AGE + Duration::milliseconds(1);
        assert!(check_freshness(Some("2024-11-10T12:00:00Z"), server_now, DEFAULT_MAX_REQUEST_AGE).is_err());
    }

    #[test]
    fn future_timestamps_are_rejected() {
        let client = at(2024, 11, 10, 12, 0, 0);
        let server_now = client - Duration::milliseconds(1);
        assert!(check_freshness(Some("2024-11-10T12:00:00Z"), server_now, DEFAULT_MAX_REQUEST_AGE).is_err());
    }
}
