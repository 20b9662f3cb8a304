use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{Instrument, error, info, info_span};

use crate::config::{Config, ServerConfig};
use crate::http::connection::{Connection, ConnectionSettings};
use crate::http::dispatch::Dispatcher;
use crate::store::{DiskStore, FileStore};

/// Serves `cfg.static_files.root` on `cfg.server.listen_addr` until the
/// future is dropped.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let store = DiskStore::new(&cfg.static_files.root);
    let dispatcher = Arc::new(Dispatcher::new(store, &cfg.static_files));

    let listener = bind(&cfg.server)?;
    info!(
        "Listening on {} (root {})",
        listener.local_addr()?,
        cfg.static_files.root
    );

    serve(listener, dispatcher, ConnectionSettings::from(&cfg.server)).await
}

/// Binds the listen address with `SO_REUSEADDR` and the configured backlog.
pub fn bind(cfg: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {:?}", cfg.listen_addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {addr}"))?;

    Ok(socket.listen(cfg.backlog)?)
}

/// Accepts connections forever, one task per client.
///
/// Accept failures are logged and do not stop the loop.
pub async fn serve<S: FileStore>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<S>>,
    settings: ConnectionSettings,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let dispatcher = Arc::clone(&dispatcher);
        let span = info_span!("conn", %peer);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, dispatcher, settings);
                match conn.run().await {
                    Ok(()) => info!(served = conn.served(), "Connection closed"),
                    Err(e) => error!("Connection error from {}: {:#}", peer, e),
                }
            }
            .instrument(span),
        );
    }
}
