use std::fmt::{Display, Formatter, Result as FmtResult};

/// The HTTP verb an endpoint is declared against. `All` matches any verb,
/// for endpoints that want a single handler regardless of method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    All,
}

impl Verb {
    pub fn matches(self, method: &http::Method) -> bool {
        match self {
            Self::All => true,
            Self::Get => method == http::Method::GET,
            Self::Post => method == http::Method::POST,
            Self::Put => method == http::Method::PUT,
            Self::Patch => method == http::Method::PATCH,
            Self::Delete => method == http::Method::DELETE,
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::All => "*",
        };
        write!(f, "{s}")
    }
}
