use {
    admission_errors::{AdmissionError, GatewayError},
    http::StatusCode,
    std::{
        error::Error as StdError,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Failures internal to canonicalization, signing, freshness, and replay
/// checking. These are never returned to callers directly; the admission
/// pipeline downgrades every variant to the wire-level [`AdmissionError`]
/// named in its `Display` message.
#[derive(Debug)]
pub enum SignatureError {
    /// The Data Manager returned no signing key, or looking it up failed.
    UnknownApiKey,
    /// `Date` header missing, unparseable, or outside the configured skew.
    Freshness(FreshnessError),
    /// The (API key, signature) pair was already observed.
    Replay,
    /// The computed digest did not match `X-Signature`.
    Mismatch,
}

#[derive(Debug)]
pub enum FreshnessError {
    MissingDateHeader,
    UnparseableDate(String),
    OutOfWindow,
}

impl Display for FreshnessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingDateHeader => write!(f, "Missing Date header"),
            Self::UnparseableDate(raw) => write!(f, "Unparseable Date header: {raw}"),
            Self::OutOfWindow => write!(f, "Request timestamp is outside the freshness window"),
        }
    }
}

impl StdError for FreshnessError {}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnknownApiKey => write!(f, "Unknown API key"),
            Self::Freshness(e) => write!(f, "{e}"),
            Self::Replay => write!(f, "Signature has already been used"),
            Self::Mismatch => write!(f, "Signature does not match"),
        }
    }
}

impl StdError for SignatureError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Freshness(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FreshnessError> for SignatureError {
    fn from(e: FreshnessError) -> Self {
        Self::Freshness(e)
    }
}

impl GatewayError for SignatureError {
    fn error_id(&self) -> &'static str {
        match self {
            Self::UnknownApiKey => "unauthorizedApp",
            Self::Freshness(_) | Self::Replay | Self::Mismatch => "invalidRequest",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::UnknownApiKey => StatusCode::UNAUTHORIZED,
            Self::Freshness(_) | Self::Replay | Self::Mismatch => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Converts a [`SignatureError`] into the pipeline-facing [`AdmissionError`].
impl From<SignatureError> for AdmissionError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::UnknownApiKey => AdmissionError::UnauthorizedApp,
            other => AdmissionError::InvalidRequest(other.to_string()),
        }
    }
}
