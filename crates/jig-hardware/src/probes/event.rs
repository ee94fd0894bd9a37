//! Event-latch probe for the ir and misc groups.
//!
//! These checks wait on a human or fixture action (press the IR remote,
//! plug the headphone jack). A background watcher task consumes edge
//! events from the fixture and latches counters; `check` reports `Pending`
//! until the requested edge has been seen often enough, which lets the
//! host poll without blocking anything.

use crate::error::{HardwareError, Result};
use crate::traits::Probe;
use jig_core::{Action, ProbeReply, RawDeviceId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// An edge observed by the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEvent {
    Press,
    Release,
}

#[derive(Debug, Default)]
struct EventCounters {
    presses: AtomicU32,
    releases: AtomicU32,
}

/// Probe for the ir and misc groups.
pub struct EventProbe {
    label: &'static str,
    /// Minimum edge count that must be exceeded before the check passes.
    required: u32,
    rx: Option<mpsc::Receiver<EdgeEvent>>,
    counters: Arc<EventCounters>,
}

impl EventProbe {
    /// Create the probe and the sender the fixture feeds edges into.
    pub fn channel(label: &'static str, required: u32) -> (Self, mpsc::Sender<EdgeEvent>) {
        let (tx, rx) = mpsc::channel(32);
        let probe = EventProbe {
            label,
            required,
            rx: Some(rx),
            counters: Arc::new(EventCounters::default()),
        };
        (probe, tx)
    }
}

impl Probe for EventProbe {
    async fn init(&mut self) -> Result<()> {
        let mut rx = self.rx.take().ok_or_else(|| {
            HardwareError::configuration(format!("{} watcher already started", self.label))
        })?;
        let counters = self.counters.clone();
        let label = self.label;

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    EdgeEvent::Press => counters.presses.fetch_add(1, Ordering::SeqCst),
                    EdgeEvent::Release => counters.releases.fetch_add(1, Ordering::SeqCst),
                };
            }
            debug!(group = label, "event source closed");
        });

        debug!(group = self.label, required = self.required, "event watcher started");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        if addr.base != 0 {
            return ProbeReply::fail_int(0);
        }
        let count = match addr.action {
            Action::WRITE => self.counters.presses.load(Ordering::SeqCst),
            Action::READ => self.counters.releases.load(Ordering::SeqCst),
            _ => return ProbeReply::fail_int(0),
        };
        if count > self.required {
            ProbeReply::pass_int(count as i32)
        } else {
            ProbeReply::pending_int(count as i32)
        }
    }
}
