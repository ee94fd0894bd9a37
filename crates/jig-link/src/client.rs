//! TCP client for the host side of the link.
//!
//! A thin transport: connect, send a request frame, await the response
//! with a timeout. No automatic retry and no connection pooling — the
//! factory host owns the polling strategy.

use crate::server::LinkError;
use futures::{SinkExt, StreamExt};
use jig_core::{GroupId, RawDeviceId};
use jig_protocol::{JigCodec, WireFrame};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info};

/// Configuration for the link client.
///
/// # Example
///
/// ```
/// use jig_link::JigClientConfig;
/// use std::time::Duration;
///
/// let config = JigClientConfig {
///     server_addr: "127.0.0.1:5000".parse().unwrap(),
///     timeout: Duration::from_millis(3000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct JigClientConfig {
    /// Server address to connect to.
    pub server_addr: SocketAddr,

    /// Timeout for connect, send and receive.
    pub timeout: Duration,
}

impl Default for JigClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:5000".parse().expect("static address parses"),
            timeout: Duration::from_millis(3000),
        }
    }
}

/// TCP client speaking the jig wire protocol.
pub struct JigClient {
    server_addr: SocketAddr,
    framed: Option<Framed<TcpStream, JigCodec>>,
    timeout: Duration,
}

impl JigClient {
    /// Create an unconnected client.
    pub fn new(config: JigClientConfig) -> Self {
        Self {
            server_addr: config.server_addr,
            framed: None,
            timeout: config.timeout,
        }
    }

    /// Whether a connection is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Connect to the board.
    ///
    /// # Errors
    /// Returns `LinkError::Timeout` when the connection attempt exceeds
    /// the configured timeout, or the underlying I/O error.
    pub async fn connect(&mut self) -> Result<(), LinkError> {
        debug!("connecting to {}", self.server_addr);
        let stream = timeout(self.timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| LinkError::Timeout(self.timeout.as_millis() as u64))??;
        stream.set_nodelay(true)?;
        self.framed = Some(Framed::new(stream, JigCodec::new()));
        info!("connected to {}", self.server_addr);
        Ok(())
    }

    /// Send one frame.
    ///
    /// # Errors
    /// Returns `LinkError::NotConnected` before [`connect`](Self::connect),
    /// `Timeout` on a stalled send, or `ConnectionLost`.
    pub async fn send(&mut self, frame: WireFrame) -> Result<(), LinkError> {
        let framed = self.framed.as_mut().ok_or(LinkError::NotConnected)?;
        timeout(self.timeout, framed.send(frame))
            .await
            .map_err(|_| LinkError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| LinkError::ConnectionLost(e.to_string()))
    }

    /// Receive the next frame.
    ///
    /// # Errors
    /// Returns `Timeout` when nothing arrives in time and
    /// `ConnectionLost` when the peer hangs up.
    pub async fn recv(&mut self) -> Result<WireFrame, LinkError> {
        let framed = self.framed.as_mut().ok_or(LinkError::NotConnected)?;
        match timeout(self.timeout, framed.next()).await {
            Err(_) => Err(LinkError::Timeout(self.timeout.as_millis() as u64)),
            Ok(None) => {
                self.framed = None;
                Err(LinkError::ConnectionLost("peer closed".to_string()))
            }
            Ok(Some(result)) => Ok(result?),
        }
    }

    /// Send a check request and await its response.
    ///
    /// # Errors
    /// Propagates send/receive failures; an in-band failing result is NOT
    /// an error — inspect the returned fragment.
    pub async fn request(
        &mut self,
        group_id: impl Into<GroupId>,
        raw_id: RawDeviceId,
    ) -> Result<WireFrame, LinkError> {
        self.send(WireFrame::request(group_id, raw_id)).await?;
        self.recv().await
    }

    /// Drop the connection.
    pub fn close(&mut self) {
        if self.framed.take().is_some() {
            debug!("disconnected from {}", self.server_addr);
        }
    }
}
