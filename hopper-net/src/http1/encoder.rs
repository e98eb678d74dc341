use super::parser::{CRLF, find_host_header};
use super::types::{ErrorResponse, Request, TargetForm};

const VERSION: &str = "HTTP/1.0";

/// Rebuilds the request for the origin. Relative requests get a fresh Host
/// line carrying the port, followed by every other header in arrival order.
pub fn serialize_request(request: &Request) -> Vec<u8> {
    let mut text = String::new();
    let skip = match request.form {
        TargetForm::Absolute => {
            text.push_str(&format!(
                "{} http://{}{} {VERSION}{CRLF}",
                request.method,
                request.authority(),
                request.path
            ));
            None
        }
        TargetForm::Relative => {
            text.push_str(&format!("{} {} {VERSION}{CRLF}", request.method, request.path));
            text.push_str(&format!("Host: {}{CRLF}", request.authority()));
            find_host_header(&request.headers)
        }
    };

    for (index, header) in request.headers.iter().enumerate() {
        if Some(index) == skip {
            continue;
        }
        text.push_str(&header.name);
        text.push_str(": ");
        text.push_str(&header.value);
        text.push_str(CRLF);
    }
    text.push_str(CRLF);
    text.into_bytes()
}

/// Status line only: no trailing CRLF, no headers, no body.
pub fn serialize_error(response: &ErrorResponse) -> Vec<u8> {
    format!("{VERSION} {} {}", response.status, response.reason).into_bytes()
}

/// First line of an origin reply, for logging.
pub fn status_line(reply: &[u8]) -> Option<&str> {
    let end = twoway::find_bytes(reply, CRLF.as_bytes()).unwrap_or(reply.len());
    std::str::from_utf8(&reply[..end])
        .ok()
        .filter(|line| !line.is_empty())
}
