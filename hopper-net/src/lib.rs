mod http1;

pub use http1::{
    Authority, Classification, DEFAULT_PORT, ErrorResponse, Header, InvalidReason, KNOWN_METHODS,
    ParseError, ParseErrorKind, ParsedRequest, Rejection, Request, RequestState,
    SUPPORTED_VERSION, TargetForm, classify, classify_bytes, find_host_header, parse_request,
    read_request, sanitize, serialize_error, serialize_request, split_authority, status_line,
};
