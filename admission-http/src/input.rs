//! The Input Validator: required headers, query parameter
//! validation/processing, and JSON body validation.

use {
    crate::{endpoint::Endpoint, params::ParamValue},
    admission_errors::AdmissionError,
    admission_signature::is_empty_body,
    http::HeaderMap,
    serde_json::Value,
    std::collections::HashMap,
};

/// The four headers every signed request must carry. Presence is checked
/// with value non-emptiness: a header present but blank counts as missing.
pub const REQUIRED_HEADERS: &[&str] = &["x-api-key", "date", "x-signature", "x-signature-nonce"];

fn header_present(headers: &HeaderMap, name: &str) -> bool {
    headers.get(name).and_then(|v| v.to_str().ok()).is_some_and(|v| !v.is_empty())
}

/// Reads a required header's value as `&str`. Only meaningful after
/// [`required_headers`] has already confirmed its presence.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|v| !v.is_empty())
}

/// Rejects a request missing any of [`REQUIRED_HEADERS`] (or present with an
/// empty value) with `missingRequiredHeaders`, naming the first one found
/// absent.
pub fn required_headers(headers: &HeaderMap) -> Result<(), AdmissionError> {
    for name in REQUIRED_HEADERS {
        if !header_present(headers, name) {
            return Err(AdmissionError::MissingRequiredHeaders((*name).to_string()));
        }
    }
    Ok(())
}

/// Validates and processes an endpoint's declared query parameters against
/// the raw query string map. A missing required parameter or one that fails
/// its validator is `invalidRequestParameters`; parameters the endpoint
/// doesn't declare are ignored.
pub fn process_query_params(
    endpoint: &Endpoint,
    raw: &HashMap<String, String>,
) -> Result<HashMap<String, ParamValue>, AdmissionError> {
    let mut processed = HashMap::with_capacity(endpoint.query_params.len());
    for descriptor in &endpoint.query_params {
        let value = raw.get(&descriptor.name).map(String::as_str).filter(|v| !v.is_empty());
        match value {
            None if descriptor.required => {
                return Err(AdmissionError::InvalidRequestParameters(format!(
                    "Missing required parameter {}",
                    descriptor.name
                )))
            }
            None => continue,
            Some(value) => {
                if !descriptor.validator.is_valid(&descriptor.name, value) {
                    return Err(AdmissionError::InvalidRequestParameters(format!(
                        "Parameter {} has an invalid value: {value}",
                        descriptor.name
                    )));
                }
                let (out_name, typed) = descriptor.processor.process(&descriptor.name, value);
                processed.insert(out_name, typed);
            }
        }
    }
    Ok(processed)
}

/// Validates the parsed JSON body against an endpoint's declared
/// requirements: a required-but-absent body is `missingJsonBody`; a present
/// body that fails the endpoint's [`crate::endpoint::BodyValidator`] is
/// `invalidJsonBody`.
pub fn validate_json_body(endpoint: &Endpoint, body: Option<&Value>) -> Result<(), AdmissionError> {
    if endpoint.json_body_required && is_empty_body(body) {
        return Err(AdmissionError::MissingJsonBody);
    }
    if let (Some(validator), Some(body)) = (&endpoint.body_validator, body) {
        if !is_empty_body(Some(body)) && !validator.is_valid(body) {
            return Err(AdmissionError::InvalidJsonBody);
        }
    }
    Ok(())
}
