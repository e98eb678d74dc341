use thiserror::Error;

pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// `GET /path HTTP/1.0` with the origin named by the `Host` header.
    Relative,
    /// `GET http://host:port/path HTTP/1.0`.
    Absolute,
}

/// A request as tokenized from the wire, before its target is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub target: String,
    pub form: TargetForm,
    pub headers: Vec<Header>,
}

/// A sanitized request: `host` is non-empty, `port` is non-zero and `path`
/// starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub form: TargetForm,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub headers: Vec<Header>,
}

impl Request {
    pub fn is_absolute(&self) -> bool {
        self.form == TargetForm::Absolute
    }

    /// Key under which the origin's reply is cached: host and path, nothing else.
    pub fn cache_key(&self) -> String {
        format!("{}{}", self.host, self.path)
    }

    /// `host` or `host:port`, with the port left out when it is the default.
    pub fn authority(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub reason: &'static str,
}

impl ErrorResponse {
    pub const fn bad_request() -> Self {
        Self {
            status: 400,
            reason: "Bad Request",
        }
    }

    pub const fn not_implemented() -> Self {
        Self {
            status: 501,
            reason: "Not Implemented",
        }
    }

    pub const fn bad_gateway() -> Self {
        Self {
            status: 502,
            reason: "Bad Gateway",
        }
    }

    pub const fn gateway_timeout() -> Self {
        Self {
            status: 504,
            reason: "Gateway Timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty request")]
    EmptyRequest,
    #[error("invalid request line")]
    InvalidRequestLine,
    #[error("invalid header line")]
    InvalidHeader,
    #[error("missing Host header")]
    MissingHost,
    #[error("empty host")]
    EmptyHost,
    #[error("invalid port")]
    InvalidPort,
}
