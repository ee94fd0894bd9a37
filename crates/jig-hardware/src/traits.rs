//! Probe and collaborator trait definitions.
//!
//! Two layers of abstraction meet here:
//!
//! - [`Probe`] is the uniform contract every peripheral group implements:
//!   one-time `init`, then `check(raw_id)` returning an in-band reply. It
//!   uses native `async fn` (Edition 2024 RPITIT), so it is not
//!   object-safe; the dispatch table uses an enum wrapper for concrete
//!   dispatch instead of `Box<dyn Probe>`.
//!
//! - The collaborator traits ([`Sysfs`], [`GpioBank`], [`AdcSampler`],
//!   [`BenchRunner`]) are the boundary to real hardware: blocking, sync,
//!   object-safe, and injected as `Arc<dyn _>`. Production implementations
//!   wrap `/sys` nodes and external utilities; the mocks in
//!   [`mock`](crate::mock) replace them in tests. Whatever text an external
//!   utility prints is scraped inside the implementation — collaborators
//!   only ever return typed values.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{BenchMode, Measurement};
use jig_core::{ProbeReply, RawDeviceId};

/// Uniform peripheral probe contract.
///
/// `check` never returns an error: dispatch failure, absent hardware and
/// below-threshold measurements are all representable in-band as a
/// status/value pair, and the caller (a serial-link peer) can only receive
/// well-formed frames anyway.
pub trait Probe: Send + Sync {
    /// One-time group initialization (export pins, take baseline samples,
    /// start background measurement tasks).
    ///
    /// # Errors
    /// Returns an error when setup could not complete; the dispatch table
    /// logs it and leaves the probe registered so later checks report the
    /// failure in-band.
    async fn init(&mut self) -> Result<()>;

    /// Run the check selected by the raw device id.
    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply;
}

/// Sysfs-style node access.
///
/// One read or write per call, whole-node semantics, no seeking. Paths are
/// configuration data, never computed by the core.
pub trait Sysfs: Send + Sync {
    /// Whether the node exists and is readable.
    fn exists(&self, path: &str) -> bool;

    /// Read the node contents as text.
    ///
    /// # Errors
    /// Returns `HardwareError::Absent` when the node does not exist and
    /// `Io` for read failures.
    fn read(&self, path: &str) -> Result<String>;

    /// Overwrite the node contents.
    ///
    /// # Errors
    /// Returns `HardwareError::Absent` when the node does not exist and
    /// `Io` for write failures.
    fn write(&self, path: &str, value: &str) -> Result<()>;
}

/// GPIO pin control.
pub trait GpioBank: Send + Sync {
    /// Make the pin available for control.
    ///
    /// # Errors
    /// Returns an error when the pin cannot be exported.
    fn export(&self, pin: u16) -> Result<()>;

    /// Configure the pin as an output and drive it to the level (0/1).
    ///
    /// # Errors
    /// Returns an error when the pin direction or value cannot be set.
    fn drive(&self, pin: u16, level: u8) -> Result<()>;

    /// Read the pin level back.
    ///
    /// # Errors
    /// Returns an error when the value cannot be read.
    fn read_level(&self, pin: u16) -> Result<u8>;
}

/// ADC channel sampling.
pub trait AdcSampler: Send + Sync {
    /// Sample the channel and return millivolts.
    ///
    /// The raw-count-to-mV scaling lives behind this trait: boards differ
    /// in resolution and reference voltage.
    ///
    /// # Errors
    /// Returns an error when the channel is missing or unreadable.
    fn sample_mv(&self, channel: u8) -> Result<i32>;
}

/// Slow throughput benchmark runner.
///
/// `measure` is a blocking operation (an external read/write benchmark
/// running to completion); the measurement engine calls it on a blocking
/// thread and never on the async request path.
pub trait BenchRunner: Send + Sync {
    /// Whether the device behind `path` is present.
    fn is_present(&self, path: &str) -> bool;

    /// Run one throughput measurement.
    ///
    /// # Errors
    /// Returns an error when the device disappears mid-run or the external
    /// command fails; a low-but-successful measurement is NOT an error.
    fn measure(&self, path: &str, mode: BenchMode) -> Result<Measurement>;

    /// Read the negotiated link speed for the device (Mb/s).
    ///
    /// # Errors
    /// Returns `HardwareError::Unsupported` for devices without a link
    /// speed node.
    fn link_speed(&self, path: &str) -> Result<i32>;
}
