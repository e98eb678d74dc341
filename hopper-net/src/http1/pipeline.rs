use thiserror::Error;

use super::parser::parse_request;
use super::sanitize::sanitize;
use super::types::{ErrorResponse, ParseError, Request};
use super::validate::{Classification, InvalidReason, classify_bytes};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid request: {0}")]
    Invalid(InvalidReason),
    #[error("method {0} is not supported")]
    NotSupported(String),
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),
}

impl Rejection {
    pub fn error_response(&self) -> ErrorResponse {
        match self {
            Rejection::NotSupported(_) => ErrorResponse::not_implemented(),
            Rejection::Invalid(_) | Rejection::Malformed(_) => ErrorResponse::bad_request(),
        }
    }
}

/// Classify, parse and sanitize one raw request.
pub fn read_request(raw: &[u8]) -> Result<Request, Rejection> {
    match classify_bytes(raw) {
        Classification::Good => {}
        Classification::Invalid(reason) => return Err(Rejection::Invalid(reason)),
        Classification::NotSupported(method) => return Err(Rejection::NotSupported(method)),
    }

    let text = std::str::from_utf8(raw).map_err(|_| Rejection::Invalid(InvalidReason::NotUtf8))?;
    let parsed = parse_request(text)?;
    Ok(sanitize(parsed)?)
}
