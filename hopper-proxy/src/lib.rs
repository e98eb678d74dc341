mod cache;
mod config;
mod connector;
mod error;
mod handler;
mod proxy;

pub use cache::{CacheEntry, ResponseCache};
pub use config::{BufferLimits, ListenConfig, ProxyConfig, UpstreamConfig};
pub use connector::{TcpConnector, UpstreamConnector};
pub use error::{ProxyError, UpstreamError};
pub use handler::Outcome;
pub use proxy::Proxy;
