use super::types::{Header, ParseError, ParseErrorKind, ParsedRequest, TargetForm};

pub(crate) const CRLF: &str = "\r\n";
const HEADER_SEPARATOR: &str = ": ";
const HOST_HEADER: &str = "Host";

/// Splits on CRLF and drops empty lines, so the header/body separator and
/// anything after it that happens to be blank vanish. Offsets are byte offsets
/// into `raw`.
pub(crate) fn non_empty_lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    raw.split(CRLF).filter_map(move |line| {
        let start = offset;
        offset += line.len() + CRLF.len();
        (!line.is_empty()).then_some((start, line))
    })
}

/// Index of the header the origin is taken from for relative-form targets.
pub fn find_host_header(headers: &[Header]) -> Option<usize> {
    headers.iter().position(|header| header.name == HOST_HEADER)
}

pub fn parse_request(raw: &str) -> Result<ParsedRequest, ParseError> {
    let mut lines = non_empty_lines(raw);
    let (line_offset, request_line) = lines.next().ok_or(ParseError {
        kind: ParseErrorKind::EmptyRequest,
        offset: 0,
    })?;

    let mut parts = request_line.split(' ');
    let (Some(method), Some(target), Some(_version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError {
            kind: ParseErrorKind::InvalidRequestLine,
            offset: line_offset,
        });
    };

    let headers = lines
        .map(|(offset, line)| parse_header(line, offset))
        .collect::<Result<Vec<_>, _>>()?;

    let form = if target.starts_with('/') {
        TargetForm::Relative
    } else {
        TargetForm::Absolute
    };

    if form == TargetForm::Relative && find_host_header(&headers).is_none() {
        return Err(ParseError {
            kind: ParseErrorKind::MissingHost,
            offset: line_offset + request_line.len(),
        });
    }

    Ok(ParsedRequest {
        method: method.to_string(),
        target: target.to_string(),
        form,
        headers,
    })
}

fn parse_header(line: &str, offset: usize) -> Result<Header, ParseError> {
    let (name, value) = line.split_once(HEADER_SEPARATOR).ok_or(ParseError {
        kind: ParseErrorKind::InvalidHeader,
        offset,
    })?;
    Ok(Header::new(name, value))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{find_host_header, parse_request};
    use crate::http1::{Header, ParseErrorKind, TargetForm};

    #[test]
    fn parses_relative_request() {
        let request =
            parse_request("GET /index.html HTTP/1.0\r\nHost: example.com\r\nAccept: */*\r\n\r\n")
                .unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.target, "/index.html");
        assert_eq!(request.form, TargetForm::Relative);
        assert_eq!(
            request.headers,
            vec![
                Header::new("Host", "example.com"),
                Header::new("Accept", "*/*"),
            ]
        );
    }

    #[test]
    fn parses_absolute_request_without_headers() {
        let request = parse_request("GET http://example.com/a HTTP/1.0\r\n").unwrap();

        assert_eq!(request.form, TargetForm::Absolute);
        assert_eq!(request.target, "http://example.com/a");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn keeps_header_order_and_duplicates() {
        let request = parse_request(
            "GET / HTTP/1.0\r\nAccept: a\r\nHost: example.com\r\nAccept: b\r\n\r\n",
        )
        .unwrap();

        let names: Vec<_> = request.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["Accept", "Host", "Accept"]);
        assert_eq!(find_host_header(&request.headers), Some(1));
    }

    #[test]
    fn header_value_keeps_later_separators() {
        let request =
            parse_request("GET / HTTP/1.0\r\nHost: example.com\r\nX-Note: a: b c\r\n\r\n")
                .unwrap();

        assert_eq!(request.headers[1], Header::new("X-Note", "a: b c"));
    }

    #[test]
    fn drops_blank_lines() {
        let request = parse_request("GET / HTTP/1.0\r\n\r\nHost: example.com\r\n\r\n\r\n").unwrap();
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn reports_header_without_separator() {
        let err = parse_request("GET / HTTP/1.0\r\nHost: example.com\r\nbroken\r\n\r\n")
            .unwrap_err();

        assert_matches!(err.kind, ParseErrorKind::InvalidHeader);
        assert_eq!(err.offset, 35);
    }

    #[test]
    fn relative_request_needs_host_header() {
        let err = parse_request("GET / HTTP/1.0\r\nX-Host: example.com\r\n\r\n").unwrap_err();
        assert_matches!(err.kind, ParseErrorKind::MissingHost);
    }

    #[test]
    fn rejects_empty_and_short_request_lines() {
        assert_matches!(
            parse_request("").unwrap_err().kind,
            ParseErrorKind::EmptyRequest
        );
        assert_matches!(
            parse_request("GET /\r\n").unwrap_err().kind,
            ParseErrorKind::InvalidRequestLine
        );
    }
}
