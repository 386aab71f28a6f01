use std::{
    net::SocketAddr,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

use super::*;
use crate::{handler::Handler, request::RequestContext};

/// Invocation counters of the `/` and `/upload` handlers.
#[derive(Default)]
struct Calls {
    start: AtomicUsize,
    upload: AtomicUsize,
}

fn registry(calls: &Arc<Calls>) -> HandlerRegistry {
    let start = Arc::clone(calls);
    let upload = Arc::clone(calls);

    HandlerRegistry::builder()
        .route("/", Handler::sync(move |ctx: &RequestContext| {
            assert!(ctx.body().is_empty());
            start.start.fetch_add(1, Ordering::SeqCst);
            "Hello World"
        }))
        .route("/upload", Handler::sync(move |ctx: &RequestContext| {
            upload.upload.fetch_add(1, Ordering::SeqCst);
            format!("You've sent: {}", ctx.body().as_str().unwrap_or_default())
        }))
        .route("/hang", Handler::deferred(|_, completion| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                completion.complete("too late");
            });
        }))
        .build()
        .unwrap()
}

struct TestServer {
    addr: SocketAddr,
    calls: Arc<Calls>,
    shutdown: oneshot::Sender<()>,
}

async fn serve(config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();
    let calls = Arc::new(Calls::default());

    let server = Server::new(registry(&calls)).config(config);
    tokio::spawn(server.serve_with_shutdown(listener, async move {
        let _ = rx.await;
    }));

    TestServer { addr, calls, shutdown }
}

async fn send(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let raw = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    send(addr, raw.as_bytes()).await
}

fn body_of(res: &str) -> &str {
    res.split_once("\r\n\r\n").map(|(_, body)| body).unwrap()
}

fn config() -> Config {
    Config::default().handler_timeout(Duration::from_millis(100))
}

#[tokio::test]
async fn test_dispatch_over_tcp() {
    let server = serve(config()).await;

    let res = get(server.addr, "/").await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert_eq!(body_of(&res), "Hello World");
    assert_eq!(server.calls.start.load(Ordering::SeqCst), 1);

    let res = send(
        server.addr,
        b"POST /upload HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
          Transfer-Encoding: chunked\r\n\r\n2\r\nab\r\n2\r\ncd\r\n0\r\n\r\n",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert_eq!(body_of(&res), "You've sent: abcd");
    assert_eq!(server.calls.upload.load(Ordering::SeqCst), 1);

    let res = get(server.addr, "/missing").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");
    assert!(res.contains("\r\nContent-Type: text/plain\r\n"), "{res}");
    assert_eq!(body_of(&res), "404 - Not Found.");

    let res = get(server.addr, "/upload/").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");

    assert_eq!(server.calls.start.load(Ordering::SeqCst), 1);
    assert_eq!(server.calls.upload.load(Ordering::SeqCst), 1);

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_timeout_does_not_stall_server() {
    let server = serve(config()).await;

    let res = get(server.addr, "/hang").await;
    assert!(res.starts_with("HTTP/1.1 504 Gateway Timeout\r\n"), "{res}");
    assert_eq!(body_of(&res), "504 - Gateway Timeout.");

    let res = get(server.addr, "/nothing").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_requests_interleave_with_pending_deferred() {
    let server = serve(Config::default().handler_timeout(Duration::from_millis(500))).await;

    let addr = server.addr;
    let hang = tokio::spawn(async move { get(addr, "/hang").await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let res = get(server.addr, "/nothing").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");
    assert!(!hang.is_finished());

    let res = get(server.addr, "/").await;
    assert_eq!(body_of(&res), "Hello World");
    assert!(!hang.is_finished());

    let res = hang.await.unwrap();
    assert!(res.starts_with("HTTP/1.1 504 Gateway Timeout\r\n"), "{res}");

    let _ = server.shutdown.send(());
}

#[tokio::test]
async fn test_body_rejections() {
    let server = serve(config().max_body_size(4)).await;

    let res = send(
        server.addr,
        b"POST /nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
          Content-Length: 8\r\n\r\n12345678",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{res}");

    let res = send(
        server.addr,
        b"POST /nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
          Content-Length: 2\r\n\r\n\xff\xfe",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{res}");

    let _ = server.shutdown.send(());
}
