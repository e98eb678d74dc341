use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::UpstreamError;

/// Opens the outbound leg of a proxied exchange.
pub trait UpstreamConnector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Stream, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl UpstreamConnector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, UpstreamError> {
        match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(UpstreamError::Connect {
                host: host.to_string(),
                port,
                source,
            }),
            Err(_) => Err(UpstreamError::ConnectTimeout {
                host: host.to_string(),
                port,
                after: self.connect_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use tokio::net::TcpListener;

    use super::{TcpConnector, UpstreamConnector};
    use crate::error::UpstreamError;

    #[tokio::test]
    async fn connects_to_listening_origin() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let connector = TcpConnector::new(Duration::from_secs(1));
        let stream = connector.connect("127.0.0.1", port).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn refused_connection_is_an_upstream_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = TcpConnector::new(Duration::from_secs(1));
        let err = connector.connect("127.0.0.1", port).await.unwrap_err();
        assert_matches!(err, UpstreamError::Connect { port: p, .. } if p == port);
        assert_eq!(err.error_response().status, 502);
    }
}
