use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hopper_proxy::{Proxy, ProxyConfig, ProxyError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const REPLY: &[u8] = b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\nHELLO";

async fn start_origin() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(REPLY).await;
        }
    });

    (addr, accepted)
}

async fn start_proxy() -> (
    SocketAddr,
    oneshot::Sender<()>,
    JoinHandle<Result<(), ProxyError>>,
) {
    let mut config = ProxyConfig::default();
    config.listen.port = 0;
    let proxy = Proxy::new(config).unwrap();
    let listener = proxy.bind().unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        proxy
            .run_until(listener, async {
                let _ = stopped.await;
            })
            .await
    });

    (addr, stop, handle)
}

async fn send(proxy: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    reply
}

#[tokio::test]
async fn proxies_over_tcp_and_reuses_cached_reply() {
    let (origin, accepted) = start_origin().await;
    let (proxy, stop, handle) = start_proxy().await;

    let absolute = format!("GET http://127.0.0.1:{}/hello HTTP/1.0\r\n\r\n", origin.port());
    let relative = format!(
        "GET /hello HTTP/1.0\r\nHost: 127.0.0.1:{}\r\nAccept: */*\r\n\r\n",
        origin.port()
    );

    assert_eq!(send(proxy, absolute.as_bytes()).await, REPLY);
    assert_eq!(send(proxy, relative.as_bytes()).await, REPLY);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn rejects_bad_requests_over_tcp() {
    let (proxy, stop, handle) = start_proxy().await;

    assert_eq!(
        send(proxy, b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").await,
        b"HTTP/1.0 400 Bad Request"
    );
    assert_eq!(
        send(proxy, b"HEAD / HTTP/1.0\r\nHost: example.com\r\n\r\n").await,
        b"HTTP/1.0 501 Not Implemented"
    );

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn concurrent_clients_are_served_independently() {
    let (origin, _) = start_origin().await;
    let (proxy, stop, handle) = start_proxy().await;

    let mut clients = Vec::new();
    for index in 0..8 {
        let request = format!(
            "GET /item/{index} HTTP/1.0\r\nHost: 127.0.0.1:{}\r\n\r\n",
            origin.port()
        );
        clients.push(tokio::spawn(async move { send(proxy, request.as_bytes()).await }));
    }
    for client in clients {
        assert_eq!(client.await.unwrap(), REPLY);
    }

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[test]
fn rejects_invalid_config() {
    let mut config = ProxyConfig::default();
    config.upstream.connect_timeout_ms = 0;
    assert!(matches!(Proxy::new(config), Err(ProxyError::Config(_))));
}
