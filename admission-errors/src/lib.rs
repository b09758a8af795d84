//! Error trait and stable error envelope shared by admission-gateway crates.
//!
//! Mirrors the role `scratchstack-errors` plays for the scratchstack
//! workspace: a small, dependency-light crate that every other crate in the
//! family implements against so that rejections can be serialized uniformly
//! regardless of which pipeline stage produced them.

use {
    http::StatusCode,
    serde::Serialize,
    std::{
        error::Error as StdError,
        fmt::{Debug, Display, Formatter, Result as FmtResult},
    },
};

/// Implemented by every error type that can terminate the admission
/// pipeline. `error_id` is the stable identifier from the wire contract;
/// `http_status` is the status code the pipeline writes to the response.
pub trait GatewayError: StdError {
    fn error_id(&self) -> &'static str;
    fn http_status(&self) -> StatusCode;

    /// Human-readable detail. Implementations that wrap a handler-raised
    /// exception should redact it here unless running in developer mode;
    /// that redaction happens in `admission-http`, not in this trait.
    fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The nine stable error IDs from the admission pipeline's wire contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    InsecureProtocol,
    MissingRequiredHeaders(String),
    UnauthorizedApp,
    InvalidRequest(String),
    InvalidRequestParameters(String),
    MissingJsonBody,
    InvalidJsonBody,
    UnauthorizedRequest,
    UnknownError(String),
}

impl AdmissionError {
    fn detail(&self) -> &str {
        match self {
            Self::InsecureProtocol => "Request must be made over HTTPS",
            Self::MissingRequiredHeaders(header) => header.as_str(),
            Self::UnauthorizedApp => "The application could not be authenticated",
            Self::InvalidRequest(detail) => detail.as_str(),
            Self::InvalidRequestParameters(detail) => detail.as_str(),
            Self::MissingJsonBody => "A JSON request body is required",
            Self::InvalidJsonBody => "The JSON request body failed validation",
            Self::UnauthorizedRequest => "The caller is not authorized to access this resource",
            Self::UnknownError(detail) => detail.as_str(),
        }
    }
}

impl Display for AdmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingRequiredHeaders(header) => write!(f, "Missing required header: {header}"),
            other => write!(f, "{}", other.detail()),
        }
    }
}

impl StdError for AdmissionError {}

impl GatewayError for AdmissionError {
    fn error_id(&self) -> &'static str {
        match self {
            Self::InsecureProtocol => "insecureProtocol",
            Self::MissingRequiredHeaders(_) => "missingRequiredHeaders",
            Self::UnauthorizedApp => "unauthorizedApp",
            Self::InvalidRequest(_) => "invalidRequest",
            Self::InvalidRequestParameters(_) => "invalidRequestParameters",
            Self::MissingJsonBody => "missingJsonBody",
            Self::InvalidJsonBody => "invalidJsonBody",
            Self::UnauthorizedRequest => "unauthorizedRequest",
            Self::UnknownError(_) => "unknownError",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::InsecureProtocol => StatusCode::FORBIDDEN,
            Self::MissingRequiredHeaders(_) | Self::MissingJsonBody | Self::InvalidJsonBody | Self::InvalidRequestParameters(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnauthorizedApp | Self::InvalidRequest(_) | Self::UnauthorizedRequest => StatusCode::UNAUTHORIZED,
            Self::UnknownError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        self.to_string()
    }
}

/// `{ "success": false, "message": ..., "error": { "id": ..., "message": ... } }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub id: &'static str,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn from_error<E: GatewayError + ?Sized>(err: &E) -> Self {
        let message = err.user_message();
        Self {
            success: false,
            message: message.clone(),
            error: ErrorBody {
                id: err.error_id(),
                message,
            },
        }
    }
}
