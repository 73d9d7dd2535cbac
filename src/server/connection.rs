// Connection module
// Serves exactly one request per accepted connection

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::AppState;
use crate::handler;
use crate::http::read_request;
use crate::logger;

/// Read one request, dispatch it, write the response and close
///
/// I/O failures are logged against the peer and never reach the accept loop.
pub async fn serve_connection<S>(stream: S, peer_addr: SocketAddr, state: &AppState)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    logger::log_connection_accepted(&peer_addr);
    if let Err(e) = handle_connection(stream, state).await {
        logger::log_connection_error(&peer_addr, &e);
    }
}

async fn handle_connection<S>(stream: S, state: &AppState) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let req = read_request(&mut reader, state.config.max_body_size()).await?;
    logger::log_request(&req);

    let res = handler::dispatch(&req, state).await;
    res.write_to(&mut writer).await?;
    writer.shutdown().await?;

    logger::log_response(req.path(), res.status(), res.body().len());
    Ok(())
}
