//! Shared upstream test doubles and gateway helpers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use search_gate::{start, ProxyHandle, ProxyOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A running upstream double.
pub struct Upstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_request: Seen,
}

impl Upstream {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw head of the most recent request received.
    pub fn last_request(&self) -> String {
        self.last_request.lock().unwrap().clone()
    }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

type Seen = Arc<std::sync::Mutex<String>>;

async fn spawn_double<F>(respond: F) -> Upstream
where
    F: Fn(TcpStream, Seen) -> tokio::task::JoinHandle<()> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let last_request: Seen = Arc::default();
    let counter = hits.clone();
    let seen = last_request.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            respond(socket, seen.clone());
        }
    });

    Upstream {
        addr,
        hits,
        last_request,
    }
}

/// Upstream that answers every request with `status`, a marker header and a
/// short body.
pub async fn start_status_backend(status: u16) -> Upstream {
    spawn_double(move |mut socket, seen| {
        tokio::spawn(async move {
            let head = read_head(&mut socket).await;
            *seen.lock().unwrap() = head;

            let reason = StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown");
            let body = format!("upstream {status}");
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nX-Upstream: double\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        })
    })
    .await
}

/// Upstream that writes non-HTTP bytes and hangs up.
pub async fn start_garbage_backend() -> Upstream {
    spawn_double(|mut socket, _| {
        tokio::spawn(async move {
            let _ = read_head(&mut socket).await;
            let _ = socket.write_all(b"abc\r\n").await;
            let _ = socket.shutdown().await;
        })
    })
    .await
}

/// Upstream that reads the request and never answers.
pub async fn start_hanging_backend() -> Upstream {
    spawn_double(|mut socket, _| {
        tokio::spawn(async move {
            let _ = read_head(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(3600)).await;
            drop(socket);
        })
    })
    .await
}

/// An address with nothing listening on it.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a gateway on an ephemeral loopback port in front of `upstream_port`.
pub async fn start_gateway(upstream_port: u16, options: ProxyOptions) -> ProxyHandle {
    let options = options
        .upstream("127.0.0.1", upstream_port)
        .bind_host("127.0.0.1");
    start(Some(0), Some(options)).await.unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn url(handle: &ProxyHandle, path_and_query: &str) -> String {
    format!("http://{}{}", handle.local_addr(), path_and_query)
}

/// Send `GET {target}` exactly as written and return the response status
/// line. Bypasses client-side URL normalization.
pub async fn raw_get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let head = read_head(&mut stream).await;
    head.lines().next().unwrap_or_default().to_string()
}

/// Poll `check` until it holds or `within` elapses.
pub async fn eventually<F: Fn() -> bool>(within: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
