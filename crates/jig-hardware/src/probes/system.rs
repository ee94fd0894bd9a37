//! System probe: memory size and framebuffer geometry.

use crate::{
    error::Result,
    traits::{Probe, Sysfs},
};
use jig_core::{ProbeReply, RawDeviceId, constants::ABSENT_VALUE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Configuration for the system group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Node reporting installed memory in MiB.
    pub mem_node: String,
    /// Expected memory bucket in MiB; 0 accepts any recognized bucket.
    pub mem_expect_mb: i32,
    /// Node reporting framebuffer geometry as "x,y".
    pub fb_node: String,
    pub fb_expect_x: i32,
    pub fb_expect_y: i32,
}

/// Probe for the system group.
pub struct SystemProbe {
    bus: Arc<dyn Sysfs>,
    config: SystemConfig,
}

impl SystemProbe {
    pub fn new(bus: Arc<dyn Sysfs>, config: SystemConfig) -> Self {
        SystemProbe { bus, config }
    }

    fn check_memory(&self) -> ProbeReply {
        let Ok(contents) = self.bus.read(&self.config.mem_node) else {
            return ProbeReply::fail_text(ABSENT_VALUE);
        };
        let raw_mb: i32 = contents.trim().parse().unwrap_or(0);
        // Installed memory never reads as the exact marketing size; round
        // up to the capacity tier it belongs to.
        let bucket = match raw_mb {
            1025..=2048 => 2048,
            2049..=4096 => 4096,
            4097..=8192 => 8192,
            _ => 0,
        };
        if bucket == 0 {
            return ProbeReply::fail_int(0);
        }
        if self.config.mem_expect_mb == 0 || bucket == self.config.mem_expect_mb {
            ProbeReply::pass_int(bucket)
        } else {
            ProbeReply::fail_int(bucket)
        }
    }

    fn fb_geometry(&self) -> Option<(i32, i32)> {
        let contents = self.bus.read(&self.config.fb_node).ok()?;
        let mut parts = contents.trim().split(',');
        let x = parts.next()?.trim().parse().ok()?;
        let y = parts.next()?.trim().parse().ok()?;
        Some((x, y))
    }

    fn check_fb(&self, want_y: bool) -> ProbeReply {
        let Some((x, y)) = self.fb_geometry() else {
            return ProbeReply::fail_text(ABSENT_VALUE);
        };
        let (observed, expected) = if want_y {
            (y, self.config.fb_expect_y)
        } else {
            (x, self.config.fb_expect_x)
        };
        if observed == expected {
            ProbeReply::pass_int(observed)
        } else {
            ProbeReply::fail_int(observed)
        }
    }
}

impl Probe for SystemProbe {
    async fn init(&mut self) -> Result<()> {
        debug!(
            mem_node = %self.config.mem_node,
            fb_node = %self.config.fb_node,
            "system group ready"
        );
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        match addr.base {
            0 => self.check_memory(),
            1 => self.check_fb(false),
            2 => self.check_fb(true),
            _ => ProbeReply::fail_int(0),
        }
    }
}
