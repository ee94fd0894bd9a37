//! Link layer of the boardjig test controller.
//!
//! The factory host talks to the board over a serial-style link carrying
//! fixed-width frames. This crate provides the TCP transport: a server
//! that drives the dispatch table for each incoming request frame, and a
//! client used by the host side and by integration tests.
//!
//! # Example
//!
//! ```no_run
//! use jig_link::{JigServer, JigServerConfig};
//! use jig_controller::DispatchTable;
//!
//! # async fn example(table: DispatchTable) -> Result<(), Box<dyn std::error::Error>> {
//! let config = JigServerConfig {
//!     bind_addr: "0.0.0.0:5000".parse()?,
//! };
//!
//! let mut server = JigServer::bind(config, table).await?;
//! server.serve().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod server;

pub use client::{JigClient, JigClientConfig};
pub use server::{JigServer, JigServerConfig, LinkError};
