use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpSocket};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use crate::connector::{TcpConnector, UpstreamConnector};
use crate::error::ProxyError;
use crate::handler::{Outcome, handle_connection};

pub struct Proxy<U = TcpConnector> {
    state: Arc<ProxyState<U>>,
}

struct ProxyState<U> {
    config: ProxyConfig,
    cache: Arc<ResponseCache>,
    connector: U,
}

impl<U> Clone for Proxy<U> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl Proxy<TcpConnector> {
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let connector = TcpConnector::new(config.upstream.connect_timeout());
        Self::with_parts(config, Arc::new(ResponseCache::new()), connector)
    }
}

impl<U: UpstreamConnector> Proxy<U> {
    pub fn with_parts(
        config: ProxyConfig,
        cache: Arc<ResponseCache>,
        connector: U,
    ) -> Result<Self, ProxyError> {
        config.validate()?;
        Ok(Self {
            state: Arc::new(ProxyState {
                config,
                cache,
                connector,
            }),
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.state.cache
    }

    /// Binds the configured address with the configured backlog.
    pub fn bind(&self) -> Result<TcpListener, ProxyError> {
        let listen = &self.state.config.listen;
        let addr: SocketAddr = format!("{}:{}", listen.host, listen.port)
            .parse()
            .map_err(|err| ProxyError::Config(format!("invalid listen address: {err}")))?;
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(listen.backlog)?;
        info!(
            address = %listener.local_addr()?,
            backlog = listen.backlog,
            "listening for connections"
        );
        Ok(listener)
    }

    pub async fn run(&self) -> Result<(), ProxyError> {
        let listener = self.bind()?;
        self.run_until(listener, std::future::pending()).await
    }

    /// Accepts until `shutdown` resolves, spawning one task per connection.
    pub async fn run_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ProxyError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down accept loop");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(error = %err, "failed to accept connection");
                        continue;
                    }
                },
            };

            let proxy = self.clone();
            let span = info_span!("connection", id = %Uuid::new_v4(), %peer);
            tokio::spawn(
                async move {
                    info!("connection established");
                    match proxy.serve_connection(stream, peer).await {
                        Ok(outcome) => debug!(?outcome, "connection closed"),
                        Err(err) => warn!(error = %err, "connection failed"),
                    }
                }
                .instrument(span),
            );
        }
    }

    /// Runs one request/response exchange on `client` and closes it.
    pub async fn serve_connection<C>(
        &self,
        mut client: C,
        peer: SocketAddr,
    ) -> Result<Outcome, ProxyError>
    where
        C: AsyncRead + AsyncWrite + Unpin,
    {
        handle_connection(
            &mut client,
            peer,
            &self.state.cache,
            &self.state.connector,
            &self.state.config,
        )
        .await
    }
}
