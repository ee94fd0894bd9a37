//! Hardware abstraction layer for the boardjig test controller.
//!
//! This crate provides the uniform [`Probe`] contract the dispatch table
//! drives, the object-safe collaborator traits that isolate every piece of
//! physical I/O, the concrete probes for the simple peripheral groups, and
//! mock collaborators for development and testing without a board.
//!
//! # Design
//!
//! - **Async probes, sync collaborators**: probes use native `async fn`
//!   (Edition 2024 RPITIT) so task-backed groups can suspend; the
//!   collaborators are blocking and object-safe (`Arc<dyn Sysfs>` etc.)
//!   because the operations behind them are blocking node reads and
//!   external utilities. Slow collaborator calls are made on blocking
//!   threads by the measurement engine, never inline on the request path.
//!
//! - **In-band failure**: `check` returns a status/value pair, never an
//!   error. Absent hardware, unknown bases and below-threshold
//!   measurements are all ordinary replies; the serial-link peer can only
//!   receive well-formed frames.
//!
//! - **Typed boundary**: whatever text an external utility prints is
//!   scraped inside the collaborator implementation. The core sees
//!   [`Measurement`](types::Measurement), millivolts, and pin levels.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jig_hardware::mock::MockAdcSampler;
//! use jig_hardware::probes::{AdcChannelConfig, AdcProbe};
//! use jig_hardware::traits::Probe;
//! use jig_hardware::types::Band;
//! use jig_core::RawDeviceId;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sampler = Arc::new(MockAdcSampler::new());
//! sampler.set_mv(3, 1358);
//!
//! let mut probe = AdcProbe::new(
//!     sampler,
//!     vec![AdcChannelConfig { channel: 3, band: Band::new(1400, 1340) }],
//! );
//!
//! let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
//! assert!(reply.status.is_pass());
//! # }
//! ```

pub mod error;
pub mod mock;
pub mod probes;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{AdcSampler, BenchRunner, GpioBank, Probe, Sysfs};
pub use types::{Band, BenchMode, Measurement, PinCode, PinPair, Thresholds};
