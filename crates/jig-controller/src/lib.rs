//! Dispatch layer of the boardjig test controller.
//!
//! Wires the probe set together: typed configuration, the wire-id route
//! table (with the act/confirm split made explicit), and the dispatch
//! table that turns every incoming (group id, raw device id) pair into a
//! fixed-width in-band result fragment.

pub mod config;
pub mod dispatch;
pub mod routes;

pub use config::ControllerConfig;
pub use dispatch::{AnyProbe, DispatchTable, FixtureHandles, Peripherals, build_table};
pub use routes::{RouteTable, VERIFY_HEADER_GID};
