use super::parser::find_host_header;
use super::types::{
    DEFAULT_PORT, ParseError, ParseErrorKind, ParsedRequest, Request, TargetForm,
};

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// `scheme? host (":" port?)? rest` as found in a Host header or an
/// absolute-form target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authority<'a> {
    pub host: &'a str,
    pub port: Option<u16>,
    pub rest: &'a str,
}

/// Scans left to right: an optional `http://` or `https://`, the host up to
/// the first `:` or `/`, an optional run of port digits after `:`, and the
/// remainder, returned unchecked.
pub fn split_authority(input: &str) -> Result<Authority<'_>, ParseError> {
    let start = SCHEMES
        .iter()
        .find(|scheme| input.starts_with(*scheme))
        .map_or(0, |scheme| scheme.len());
    let bytes = input.as_bytes();

    let mut cursor = start;
    while cursor < bytes.len() && bytes[cursor] != b':' && bytes[cursor] != b'/' {
        cursor += 1;
    }
    let host = &input[start..cursor];
    if host.is_empty() {
        return Err(ParseError {
            kind: ParseErrorKind::EmptyHost,
            offset: start,
        });
    }

    let mut port = None;
    if bytes.get(cursor) == Some(&b':') {
        cursor += 1;
        let digits_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        let digits = &input[digits_start..cursor];
        if !digits.is_empty() {
            let value = digits
                .parse::<u16>()
                .ok()
                .filter(|value| *value != 0)
                .ok_or(ParseError {
                    kind: ParseErrorKind::InvalidPort,
                    offset: digits_start,
                })?;
            port = Some(value);
        }
    }

    Ok(Authority {
        host,
        port,
        rest: &input[cursor..],
    })
}

/// Resolves the origin of a parsed request. Relative targets take host and
/// port from the Host header, whose value is rewritten to the bare host, and
/// anything after the port is dropped. Absolute targets take all three parts
/// from the target itself, and what follows the port must be a path.
pub fn sanitize(parsed: ParsedRequest) -> Result<Request, ParseError> {
    let ParsedRequest {
        method,
        target,
        form,
        mut headers,
    } = parsed;

    let (host, port, path) = match form {
        TargetForm::Relative => {
            let index = find_host_header(&headers).ok_or(ParseError {
                kind: ParseErrorKind::MissingHost,
                offset: 0,
            })?;
            let authority = split_authority(&headers[index].value)?;
            let host = authority.host.to_string();
            let port = authority.port.unwrap_or(DEFAULT_PORT);
            headers[index].value = host.clone();
            (host, port, target)
        }
        TargetForm::Absolute => {
            let authority = split_authority(&target)?;
            let path = match authority.rest {
                "" => "/".to_string(),
                rest if rest.starts_with('/') => rest.to_string(),
                rest => {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidPort,
                        offset: target.len() - rest.len(),
                    });
                }
            };
            (
                authority.host.to_string(),
                authority.port.unwrap_or(DEFAULT_PORT),
                path,
            )
        }
    };

    Ok(Request {
        method,
        form,
        host,
        port,
        path,
        headers,
    })
}
