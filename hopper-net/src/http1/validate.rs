use thiserror::Error;

use super::parser::non_empty_lines;

pub const SUPPORTED_VERSION: &str = "HTTP/1.0";

pub const KNOWN_METHODS: [&str; 9] = [
    "GET", "POST", "HEAD", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

const HOST_MARKER: &str = "Host: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Good,
    InvalidInput,
    NotSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("request is empty")]
    EmptyRequest,
    #[error("request is not valid utf-8")]
    NotUtf8,
    #[error("request line is not `<method> <target> <version>`")]
    MalformedRequestLine,
    #[error("version is not HTTP/1.0")]
    UnsupportedVersion,
    #[error("unknown method")]
    UnknownMethod,
    #[error("relative target without a Host header")]
    MissingHost,
    #[error("header line is not `<name>: <value>`")]
    MalformedHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Good,
    Invalid(InvalidReason),
    NotSupported(String),
}

impl Classification {
    pub fn state(&self) -> RequestState {
        match self {
            Classification::Good => RequestState::Good,
            Classification::Invalid(_) => RequestState::InvalidInput,
            Classification::NotSupported(_) => RequestState::NotSupported,
        }
    }
}

/// Gates run in order and the first failure wins, so a malformed request is
/// always reported as invalid even when its method is also unsupported.
pub fn classify(raw: &str) -> Classification {
    let mut lines = non_empty_lines(raw);
    let Some((_, request_line)) = lines.next() else {
        return Classification::Invalid(InvalidReason::EmptyRequest);
    };

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let [method, target, version] = tokens.as_slice() else {
        return Classification::Invalid(InvalidReason::MalformedRequestLine);
    };
    if tokens.iter().any(|token| token.is_empty()) {
        return Classification::Invalid(InvalidReason::MalformedRequestLine);
    }
    if *version != SUPPORTED_VERSION {
        return Classification::Invalid(InvalidReason::UnsupportedVersion);
    }
    if !KNOWN_METHODS.contains(method) {
        return Classification::Invalid(InvalidReason::UnknownMethod);
    }
    if target.starts_with('/') && !raw.contains(HOST_MARKER) {
        return Classification::Invalid(InvalidReason::MissingHost);
    }
    if lines.any(|(_, line)| !is_header_line(line)) {
        return Classification::Invalid(InvalidReason::MalformedHeader);
    }
    if *method != "GET" {
        return Classification::NotSupported(method.to_string());
    }

    Classification::Good
}

pub fn classify_bytes(raw: &[u8]) -> Classification {
    match std::str::from_utf8(raw) {
        Ok(text) => classify(text),
        Err(_) => Classification::Invalid(InvalidReason::NotUtf8),
    }
}

fn is_header_line(line: &str) -> bool {
    match line.split_once(": ") {
        Some((name, _)) => is_token(name),
        None => false,
    }
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
}
