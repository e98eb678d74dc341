use std::net::SocketAddr;

use bytes::Bytes;
use hopper_net::{Request, read_request, serialize_error, serialize_request, status_line};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{Level, debug, info, warn};

use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use crate::connector::UpstreamConnector;
use crate::error::{ProxyError, UpstreamError};

/// How a single client exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The client closed without sending anything.
    Closed,
    Rejected { status: u16 },
    Cached { bytes: usize },
    Forwarded { bytes: usize },
    UpstreamFailed { status: u16 },
}

pub(crate) async fn handle_connection<C, U>(
    client: &mut C,
    peer: SocketAddr,
    cache: &ResponseCache,
    connector: &U,
    config: &ProxyConfig,
) -> Result<Outcome, ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    U: UpstreamConnector,
{
    let outcome = exchange(client, peer, cache, connector, config).await?;
    client.shutdown().await?;
    Ok(outcome)
}

async fn exchange<C, U>(
    client: &mut C,
    peer: SocketAddr,
    cache: &ResponseCache,
    connector: &U,
    config: &ProxyConfig,
) -> Result<Outcome, ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    U: UpstreamConnector,
{
    let mut buffer = vec![0u8; config.limits.max_request_bytes];
    let n = client.read(&mut buffer).await?;
    if n == 0 {
        debug!("client closed before sending a request");
        return Ok(Outcome::Closed);
    }
    buffer.truncate(n);

    let request = match read_request(&buffer) {
        Ok(request) => request,
        Err(rejection) => {
            let response = rejection.error_response();
            info!(reason = %rejection, status = response.status, "rejecting request");
            client.write_all(&serialize_error(&response)).await?;
            return Ok(Outcome::Rejected {
                status: response.status,
            });
        }
    };
    log_request(peer, &request);

    let key = request.cache_key();
    if let Some(entry) = cache.get(&key).await {
        info!(
            %key,
            stored_at = %entry.stored_at.to_rfc3339(),
            "serving cached response"
        );
        client.write_all(&entry.response).await?;
        return Ok(Outcome::Cached {
            bytes: entry.response.len(),
        });
    }

    info!(%key, host = %request.host, port = request.port, "cache miss, forwarding");
    match fetch(&request, connector, config).await {
        Ok(reply) => {
            info!(
                %key,
                status = status_line(&reply).unwrap_or("<unreadable>"),
                bytes = reply.len(),
                "caching upstream reply"
            );
            cache.put(key, reply.clone()).await;
            client.write_all(&reply).await?;
            Ok(Outcome::Forwarded { bytes: reply.len() })
        }
        Err(err) => {
            let response = err.error_response();
            warn!(error = %err, status = response.status, "upstream request failed");
            client.write_all(&serialize_error(&response)).await?;
            Ok(Outcome::UpstreamFailed {
                status: response.status,
            })
        }
    }
}

/// One connect, one send, one bounded read. The send and the read share the
/// configured read timeout.
async fn fetch<U>(
    request: &Request,
    connector: &U,
    config: &ProxyConfig,
) -> Result<Bytes, UpstreamError>
where
    U: UpstreamConnector,
{
    let mut upstream = connector.connect(&request.host, request.port).await?;
    let wire = serialize_request(request);
    let mut buffer = vec![0u8; config.limits.max_response_bytes];
    let read_timeout = config.upstream.read_timeout();

    let n = timeout(read_timeout, async {
        upstream.write_all(&wire).await.map_err(UpstreamError::Write)?;
        upstream.flush().await.map_err(UpstreamError::Write)?;
        upstream.read(&mut buffer).await.map_err(UpstreamError::Read)
    })
    .await
    .map_err(|_| UpstreamError::ReadTimeout(read_timeout))??;
    if let Err(err) = upstream.shutdown().await {
        debug!(error = %err, "upstream shutdown failed");
    }

    if n == 0 {
        return Err(UpstreamError::EmptyReply);
    }
    buffer.truncate(n);
    Ok(Bytes::from(buffer))
}

fn log_request(peer: SocketAddr, request: &Request) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let headers = request
        .headers
        .iter()
        .map(|header| format!("{}: {}", header.name, header.value))
        .collect::<Vec<_>>()
        .join(", ");
    debug!(
        client = %peer,
        method = %request.method,
        host = %request.host,
        port = request.port,
        path = %request.path,
        absolute = request.is_absolute(),
        %headers,
        "sanitized request"
    );
}
