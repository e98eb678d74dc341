use std::time::Duration;

use hopper_net::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy configuration error: {0}")]
    Config(String),
    #[error("proxy IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out connecting to {host}:{port} after {after:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        after: Duration,
    },
    #[error("failed to send request upstream: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to read upstream reply: {0}")]
    Read(#[source] std::io::Error),
    #[error("timed out waiting for upstream reply after {0:?}")]
    ReadTimeout(Duration),
    #[error("upstream closed without replying")]
    EmptyReply,
}

impl UpstreamError {
    pub fn error_response(&self) -> ErrorResponse {
        match self {
            UpstreamError::ConnectTimeout { .. } | UpstreamError::ReadTimeout(_) => {
                ErrorResponse::gateway_timeout()
            }
            _ => ErrorResponse::bad_gateway(),
        }
    }
}
