// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop
///
/// Sequential mode serves each connection to completion before accepting the
/// next, so requests are answered strictly in accept order. Concurrent mode
/// spawns one task per connection over the shared, read-only state. Accept
/// errors are logged and the loop keeps going.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future,
{
    let concurrent = state.config.server.concurrent;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        if concurrent {
                            let state = Arc::clone(&state);
                            tokio::spawn(async move {
                                serve_connection(stream, peer_addr, &state).await;
                            });
                        } else {
                            serve_connection(stream, peer_addr, &state).await;
                        }
                    }
                    Err(e) => logger::log_accept_error(&e),
                }
            }

            _ = &mut shutdown => {
                logger::log_shutdown();
                break;
            }
        }
    }
}
