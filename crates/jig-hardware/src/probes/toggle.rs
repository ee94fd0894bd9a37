//! Write-then-readback probe for led and pwm groups.
//!
//! Both groups are the same shape: write a set or clear token to a control
//! node, read the node back, and pass only when the readback matches what
//! was written. One probe covers both.

use crate::{
    error::Result,
    traits::{Probe, Sysfs},
};
use jig_core::{Action, ProbeReply, RawDeviceId, constants::ABSENT_VALUE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One controllable node with its set/clear tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleTargetConfig {
    pub path: String,
    pub set: String,
    pub clear: String,
}

/// Probe for the led and pwm groups.
pub struct ToggleProbe {
    label: &'static str,
    bus: Arc<dyn Sysfs>,
    targets: Vec<ToggleTargetConfig>,
}

impl ToggleProbe {
    pub fn new(
        label: &'static str,
        bus: Arc<dyn Sysfs>,
        targets: Vec<ToggleTargetConfig>,
    ) -> Self {
        ToggleProbe {
            label,
            bus,
            targets,
        }
    }
}

impl Probe for ToggleProbe {
    async fn init(&mut self) -> Result<()> {
        debug!(group = self.label, targets = self.targets.len(), "toggle group ready");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        let Some(target) = self.targets.get(addr.base as usize) else {
            return ProbeReply::fail_int(0);
        };
        if !self.bus.exists(&target.path) {
            return ProbeReply::fail_text(ABSENT_VALUE);
        }

        let token = match addr.action {
            Action::WRITE => &target.set,
            Action::READ => &target.clear,
            _ => return ProbeReply::fail_int(0),
        };

        if self.bus.write(&target.path, token).is_err() {
            return ProbeReply::fail_int(0);
        }

        let written: i32 = token.trim().parse().unwrap_or(0);
        match self.bus.read(&target.path) {
            Ok(contents) => {
                let observed: i32 = contents.trim().parse().unwrap_or(0);
                if observed == written {
                    ProbeReply::pass_int(observed)
                } else {
                    ProbeReply::fail_int(observed)
                }
            }
            Err(_) => ProbeReply::fail_int(0),
        }
    }
}
