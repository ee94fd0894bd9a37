//! Bench-backed probe for the storage and usb groups.

use crate::engine::BenchEngine;
use jig_core::{Action, ProbeReply, RawDeviceId};
use jig_hardware::{error::Result, traits::Probe, types::BenchMode};
use std::sync::Arc;
use tracing::debug;

/// Probe binding a [`BenchEngine`] to the wire contract.
///
/// Base selects the device slot; action 0 = read throughput, 1 = write
/// throughput, 2 = link speed.
pub struct BenchProbe {
    label: &'static str,
    engine: Arc<BenchEngine>,
}

impl BenchProbe {
    pub fn new(label: &'static str, engine: Arc<BenchEngine>) -> Self {
        BenchProbe { label, engine }
    }

    /// Engine accessor, for wiring the same registry elsewhere.
    #[must_use]
    pub fn engine(&self) -> &Arc<BenchEngine> {
        &self.engine
    }
}

impl Probe for BenchProbe {
    async fn init(&mut self) -> Result<()> {
        let spawned = self.engine.prime();
        debug!(group = self.label, warmups = spawned, "bench group ready");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        let index = addr.base as usize;
        match addr.action {
            Action::READ => self.engine.check(index, BenchMode::Read).await,
            Action::WRITE => self.engine.check(index, BenchMode::Write).await,
            Action::LINK => self.engine.link(index),
            _ => ProbeReply::fail_int(0),
        }
    }
}
