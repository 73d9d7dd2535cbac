// Server module entry point
// Binds the listener and runs the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::logger;
use crate::routing::RouteRegistry;

// Re-export commonly used items
pub use connection::serve_connection;
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

/// Bind the configured address, logging a boot failure
///
/// Failing to bind is fatal: the error is returned to the caller.
pub fn bind(config: &Config) -> io::Result<TcpListener> {
    let addr_text = format!("{}:{}", config.server.host, config.server.port);
    let result = config
        .get_socket_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
        .and_then(create_listener);

    if let Err(e) = &result {
        logger::log_boot_failure(&addr_text, e);
    }
    result
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, config: Config, registry: RouteRegistry, shutdown: F)
where
    F: Future,
{
    let state = Arc::new(AppState::new(config, registry));
    if let Ok(addr) = listener.local_addr() {
        logger::log_server_start(
            &addr,
            &state.config.static_files.root,
            state.config.server.concurrent,
            state.registry.len(),
        );
    }
    start_server_loop(listener, state, shutdown).await;
}

/// Bind and serve; only returns early when the listener cannot be created
pub async fn run<F>(config: Config, registry: RouteRegistry, shutdown: F) -> io::Result<()>
where
    F: Future,
{
    let listener = bind(&config)?;
    serve(listener, config, registry, shutdown).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Args, ControllerDescriptor, HandlerResult, ParamType};
    use crate::controllers;
    use std::net::SocketAddr;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    fn square(args: &mut Args<'_>) -> HandlerResult {
        let n = args.int(0)?;
        Ok(Some(n.saturating_mul(n).to_string()))
    }

    struct TestServer {
        addr: SocketAddr,
        shutdown_tx: Option<oneshot::Sender<()>>,
        task: JoinHandle<()>,
        _static_dir: TempDir,
    }

    impl TestServer {
        async fn start(concurrent: bool) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("index.html"), "<h1>Hi</h1>").unwrap();
            std::fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

            let mut config = Config::load_from("does/not/exist/config").unwrap();
            config.server.host = "127.0.0.1".to_string();
            config.server.port = 0;
            config.server.concurrent = concurrent;
            config.static_files.root = dir.path().to_string_lossy().into_owned();

            let mut registry = RouteRegistry::new();
            registry.mount(controllers::descriptors()).unwrap();
            registry
                .mount([ControllerDescriptor::get("/square", "MathController.square", square)
                    .query("n", "0", ParamType::Int)])
                .unwrap();

            let listener = bind(&config).unwrap();
            let addr = listener.local_addr().unwrap();
            let (tx, rx) = oneshot::channel::<()>();
            let task = tokio::spawn(async move {
                serve(listener, config, registry, rx).await;
            });

            Self {
                addr,
                shutdown_tx: Some(tx),
                task,
                _static_dir: dir,
            }
        }

        async fn send(&self, raw: &[u8]) -> Vec<u8> {
            let mut stream = TcpStream::connect(self.addr).await.unwrap();
            stream.write_all(raw).await.unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).await.unwrap();
            out
        }

        async fn get(&self, target: &str) -> String {
            let raw = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
            String::from_utf8_lossy(&self.send(raw.as_bytes()).await).into_owned()
        }

        async fn stop(mut self) {
            if let Some(tx) = self.shutdown_tx.take() {
                let _ = tx.send(());
            }
            self.task.await.unwrap();
        }
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map_or("", |(_, b)| b)
    }

    #[tokio::test]
    async fn test_hello_controller() {
        let server = TestServer::start(false).await;

        let res = server.get("/hello?name=Bob").await;
        assert!(res.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(res.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert_eq!(body(&res), "Hola, Bob");

        let res = server.get("/hello").await;
        assert_eq!(body(&res), "Hola, World");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_health_controller() {
        let server = TestServer::start(false).await;
        let res = server.get("/health").await;
        assert_eq!(body(&res), "The server is healthy");
        server.stop().await;
    }

    #[tokio::test]
    async fn test_static_files() {
        let server = TestServer::start(false).await;

        let res = server.get("/").await;
        assert!(res.contains("Content-Type: text/html\r\n"));
        assert_eq!(body(&res), "<h1>Hi</h1>");

        let raw = server.send(b"GET /logo.png HTTP/1.1\r\n\r\n").await;
        assert!(raw.ends_with(&[0x89, b'P', b'N', b'G']));
        assert!(String::from_utf8_lossy(&raw).contains("Content-Type: image/png\r\n"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = TestServer::start(false).await;
        let res = server.get("/missing.txt").await;
        assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(body(&res).contains("/missing.txt"));
        server.stop().await;
    }

    #[tokio::test]
    async fn test_bad_conversion_is_400() {
        let server = TestServer::start(false).await;

        let res = server.get("/square?n=abc").await;
        assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(body(&res), "Invalid value for type int");

        let res = server.get("/square?n=7").await;
        assert_eq!(body(&res), "49");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_method_mismatch_falls_back_to_static() {
        let server = TestServer::start(false).await;
        let raw = server
            .send(b"POST /hello?name=Post HTTP/1.1\r\nContent-Length: 7\r\n\r\n{\"a\":1}")
            .await;
        // Only GET /hello is registered, so POST falls through to the static fallback
        assert!(String::from_utf8_lossy(&raw).starts_with("HTTP/1.1 404"));
        server.stop().await;
    }

    #[tokio::test]
    async fn test_sequential_mode_answers_in_accept_order() {
        let server = TestServer::start(false).await;

        // The first client stalls mid-request; the second must wait behind it
        let mut slow = TcpStream::connect(server.addr).await.unwrap();
        slow.write_all(b"GET /hello?name=First HTTP/1.1\r\n").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let addr = server.addr;
        let second = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /hello?name=Second HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            let mut out = String::new();
            stream.read_to_string(&mut out).await.unwrap();
            out
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!second.is_finished());

        slow.write_all(b"\r\n").await.unwrap();
        let mut first = String::new();
        slow.read_to_string(&mut first).await.unwrap();
        assert_eq!(body(&first), "Hola, First");

        let second = second.await.unwrap();
        assert_eq!(body(&second), "Hola, Second");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_concurrent_mode_is_not_blocked_by_a_slow_client() {
        let server = TestServer::start(true).await;

        let mut slow = TcpStream::connect(server.addr).await.unwrap();
        slow.write_all(b"GET /hello?name=Slow HTTP/1.1\r\n").await.unwrap();

        let res = server.get("/hello?name=Fast").await;
        assert_eq!(body(&res), "Hola, Fast");

        slow.write_all(b"\r\n").await.unwrap();
        let mut out = String::new();
        slow.read_to_string(&mut out).await.unwrap();
        assert_eq!(body(&out), "Hola, Slow");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_reset_connection_does_not_stop_the_loop() {
        let server = TestServer::start(false).await;

        // Zero linger turns the close into a reset
        let mut reset = TcpStream::connect(server.addr).await.unwrap();
        socket2::SockRef::from(&reset)
            .set_linger(Some(std::time::Duration::ZERO))
            .unwrap();
        reset.write_all(b"GET /hello HTTP/1.1\r\n").await.unwrap();
        drop(reset);

        let res = server.get("/hello").await;
        assert_eq!(body(&res), "Hola, World");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let mut config = Config::load_from("does/not/exist/config").unwrap();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = taken.local_addr().unwrap().port();

        let result = run(config, RouteRegistry::new(), std::future::pending::<()>()).await;
        assert!(result.is_err());
    }
}
