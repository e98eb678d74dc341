mod encoder;
mod parser;
mod pipeline;
mod sanitize;
mod types;
mod validate;

pub use encoder::{serialize_error, serialize_request, status_line};
pub use parser::{find_host_header, parse_request};
pub use pipeline::{Rejection, read_request};
pub use sanitize::{Authority, sanitize, split_authority};
pub use types::{
    DEFAULT_PORT, ErrorResponse, Header, ParseError, ParseErrorKind, ParsedRequest, Request,
    TargetForm,
};
pub use validate::{
    Classification, InvalidReason, KNOWN_METHODS, RequestState, SUPPORTED_VERSION, classify,
    classify_bytes,
};
