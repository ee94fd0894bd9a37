//! TCP server driving the dispatch table.
//!
//! The factory host opens one connection to the board under test and polls
//! it with request frames; the server answers every frame with the
//! dispatch table's in-band response. Peers are served one at a time —
//! there is exactly one host per jig — and a dropped connection simply
//! returns the server to accepting.
//!
//! A framing error on the stream is logged and the connection keeps going:
//! the codec consumes the malformed window and resynchronizes on the next
//! start marker, so one corrupted frame never wedges the link.

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use jig_controller::DispatchTable;
use jig_protocol::JigCodec;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

/// Configuration for the link server.
///
/// # Example
///
/// ```
/// use jig_link::JigServerConfig;
///
/// let config = JigServerConfig {
///     bind_addr: "0.0.0.0:5000".parse().unwrap(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct JigServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for JigServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().expect("static address parses"),
        }
    }
}

/// Errors that can occur during link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to bind to address.
    #[error("Failed to bind to {0}")]
    BindFailed(SocketAddr),

    /// Not connected to a peer.
    #[error("Not connected")]
    NotConnected,

    /// Operation timed out.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Connection was lost during operation.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Protocol-level error from the codec.
    #[error("Protocol error: {0}")]
    Protocol(#[from] jig_core::Error),

    /// Low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// TCP server speaking the jig wire protocol.
///
/// Owns the dispatch table; every decoded request frame is answered with
/// the table's response frame.
pub struct JigServer {
    listener: TcpListener,
    table: DispatchTable,
    config: JigServerConfig,
}

impl JigServer {
    /// Bind the server to the configured address.
    ///
    /// # Errors
    /// Returns `LinkError::BindFailed` if the address is in use or not
    /// bindable.
    pub async fn bind(config: JigServerConfig, table: DispatchTable) -> Result<Self, LinkError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|_| LinkError::BindFailed(config.bind_addr))?;

        info!("link server listening on {}", config.bind_addr);

        Ok(Self {
            listener,
            table,
            config,
        })
    }

    /// Actual bound address (relevant when binding to port 0).
    ///
    /// # Errors
    /// Returns the underlying I/O error if the socket is gone.
    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run group initialization, then accept and serve peers forever.
    ///
    /// # Errors
    /// Returns only on accept failure; per-connection errors are logged
    /// and the server goes back to accepting.
    pub async fn serve(&mut self) -> Result<(), LinkError> {
        self.table.init_all().await;

        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, "host connected");
            if let Err(e) = self.serve_peer(stream, peer).await {
                warn!(%peer, error = %e, "connection ended with error");
            }
        }
    }

    /// Serve one peer until it disconnects.
    async fn serve_peer(&mut self, stream: TcpStream, peer: SocketAddr) -> Result<(), LinkError> {
        stream.set_nodelay(true)?;
        let connected_at: DateTime<Utc> = Utc::now();
        let mut framed = Framed::new(stream, JigCodec::new());
        let mut served = 0u64;

        while let Some(result) = framed.next().await {
            match result {
                Ok(request) => {
                    trace!(%peer, frame = %request, "request");
                    let response = self.table.respond(&request).await;
                    trace!(%peer, frame = %response, "response");
                    if let Err(e) = framed.send(response).await {
                        return Err(LinkError::ConnectionLost(e.to_string()));
                    }
                    served += 1;
                }
                Err(e) => {
                    // The codec consumed the bad window; keep reading.
                    warn!(%peer, error = %e, "framing error, resynchronizing");
                }
            }
        }

        let uptime = Utc::now() - connected_at;
        info!(%peer, served, uptime_ms = uptime.num_milliseconds(), "host disconnected");
        debug!(bind = %self.config.bind_addr, "back to accepting");
        Ok(())
    }
}
