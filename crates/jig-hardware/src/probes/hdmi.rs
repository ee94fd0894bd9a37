//! HDMI probe: EDID header and hot-plug status.
//!
//! Each device is a sysfs node whose contents must start with a known
//! token (the EDID magic rendered as hex, or "connected" for HPD).

use crate::{
    error::Result,
    traits::{Probe, Sysfs},
};
use jig_core::{ProbeReply, RawDeviceId, constants::ABSENT_VALUE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A node whose contents are prefix-matched against an expected token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchNodeConfig {
    pub path: String,
    pub expect: String,
}

/// Probe for the hdmi group.
pub struct HdmiProbe {
    bus: Arc<dyn Sysfs>,
    nodes: Vec<MatchNodeConfig>,
}

impl HdmiProbe {
    pub fn new(bus: Arc<dyn Sysfs>, nodes: Vec<MatchNodeConfig>) -> Self {
        HdmiProbe { bus, nodes }
    }
}

impl Probe for HdmiProbe {
    async fn init(&mut self) -> Result<()> {
        let present = self.nodes.iter().filter(|n| self.bus.exists(&n.path)).count();
        debug!(nodes = self.nodes.len(), present, "hdmi group ready");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        let Some(node) = self.nodes.get(addr.base as usize) else {
            return ProbeReply::fail_int(0);
        };
        if !self.bus.exists(&node.path) {
            return ProbeReply::fail_text(ABSENT_VALUE);
        }
        match self.bus.read(&node.path) {
            Ok(contents) if contents.trim_start().starts_with(&node.expect) => {
                ProbeReply::pass_int(1)
            }
            _ => ProbeReply::fail_int(0),
        }
    }
}
