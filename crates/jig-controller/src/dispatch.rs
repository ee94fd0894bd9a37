//! Dispatch table: route incoming test requests to probes.
//!
//! The table owns every registered probe (no ambient per-device statics)
//! and is the boundary where errors stop: an unroutable group id, an
//! unregistered probe or a bad raw id all produce the fixed in-band
//! "unknown" fragment — the serial-link peer can only receive well-formed
//! frames, so nothing propagates.

use crate::config::ControllerConfig;
use crate::routes::{RouteTable, VERIFY_HEADER_GID};
use jig_bench::{BenchEngine, BenchProbe};
use jig_core::{Group, GroupId, ProbeReply, RawDeviceId, TestKind};
use jig_hardware::{
    probes::{
        AdcProbe, EdgeEvent, EventProbe, HdmiProbe, HeaderProbe, SystemProbe, ToggleProbe,
        VerifyProbe,
    },
    traits::{AdcSampler, BenchRunner, GpioBank, Probe, Sysfs},
};
use jig_protocol::{ResultFragment, WireFrame};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Group initialization order.
///
/// Firmware and ethernet identity come first (later probes assume a
/// configured, linked interface), simple sysfs probes next, and
/// task-backed probes last so their background work starts as late as
/// possible and overlaps the remaining setup.
const INIT_ORDER: [Group; 14] = [
    Group::Firmware,
    Group::Ethernet,
    Group::System,
    Group::Hdmi,
    Group::Adc,
    Group::Header,
    Group::Audio,
    Group::Led,
    Group::Pwm,
    Group::Gpio,
    Group::Ir,
    Group::Misc,
    Group::Storage,
    Group::Usb,
];

/// Concrete-type dispatch over every probe implementation.
///
/// Native `async fn` in traits is not object-safe, so the table stores
/// this enum instead of `Box<dyn Probe>`.
pub enum AnyProbe {
    Bench(BenchProbe),
    Adc(AdcProbe),
    Hdmi(HdmiProbe),
    Toggle(ToggleProbe),
    Header(HeaderProbe),
    Verify(VerifyProbe),
    System(SystemProbe),
    Event(EventProbe),
}

impl Probe for AnyProbe {
    async fn init(&mut self) -> jig_hardware::Result<()> {
        match self {
            Self::Bench(probe) => probe.init().await,
            Self::Adc(probe) => probe.init().await,
            Self::Hdmi(probe) => probe.init().await,
            Self::Toggle(probe) => probe.init().await,
            Self::Header(probe) => probe.init().await,
            Self::Verify(probe) => probe.init().await,
            Self::System(probe) => probe.init().await,
            Self::Event(probe) => probe.init().await,
        }
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        match self {
            Self::Bench(probe) => probe.check(raw).await,
            Self::Adc(probe) => probe.check(raw).await,
            Self::Hdmi(probe) => probe.check(raw).await,
            Self::Toggle(probe) => probe.check(raw).await,
            Self::Header(probe) => probe.check(raw).await,
            Self::Verify(probe) => probe.check(raw).await,
            Self::System(probe) => probe.check(raw).await,
            Self::Event(probe) => probe.check(raw).await,
        }
    }
}

/// Routes requests to probes and composes in-band responses.
pub struct DispatchTable {
    probes: HashMap<(TestKind, Group), AnyProbe>,
    routes: RouteTable,
}

impl DispatchTable {
    pub fn new(routes: RouteTable) -> Self {
        DispatchTable {
            probes: HashMap::new(),
            routes,
        }
    }

    /// Register a probe for a (kind, group) key, replacing any previous
    /// registration.
    pub fn register(&mut self, kind: TestKind, group: Group, probe: AnyProbe) {
        self.probes.insert((kind, group), probe);
    }

    /// Number of registered probes.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Initialize every registered group once, in dependency order.
    ///
    /// A failed init is logged and the probe stays registered: later
    /// checks report the failure in-band. Returns the number of probes
    /// that initialized cleanly.
    pub async fn init_all(&mut self) -> usize {
        let mut ready = 0;
        for group in INIT_ORDER {
            for kind in [TestKind::Command, TestKind::Verify] {
                let Some(probe) = self.probes.get_mut(&(kind, group)) else {
                    continue;
                };
                match probe.init().await {
                    Ok(()) => {
                        debug!(group = %group, ?kind, "group initialized");
                        ready += 1;
                    }
                    Err(e) => {
                        warn!(group = %group, ?kind, error = %e, "group init failed");
                    }
                }
            }
        }
        info!(ready, registered = self.probes.len(), "group initialization finished");
        ready
    }

    /// Handle a request already resolved to a dispatch key.
    pub async fn handle(
        &mut self,
        kind: TestKind,
        group: Group,
        raw: RawDeviceId,
    ) -> ResultFragment {
        let Some(probe) = self.probes.get_mut(&(kind, group)) else {
            debug!(group = %group, ?kind, "no probe registered");
            return ResultFragment::unknown();
        };
        probe.check(raw).await.into()
    }

    /// Handle a request by wire addressing.
    ///
    /// Unroutable group ids resolve to the in-band "unknown" fragment.
    pub async fn handle_wire(&mut self, gid: GroupId, raw: RawDeviceId) -> ResultFragment {
        match self.routes.resolve(gid) {
            Some((kind, group)) => self.handle(kind, group, raw).await,
            None => {
                debug!(gid = %gid, "unroutable group id");
                ResultFragment::unknown()
            }
        }
    }

    /// Produce the response frame for a request frame.
    pub async fn respond(&mut self, request: &WireFrame) -> WireFrame {
        let fragment = self.handle_wire(request.group_id, request.raw_id).await;
        WireFrame::response_to(request, fragment)
    }
}

/// Physical collaborators behind the probe set.
///
/// Production wiring passes sysfs/shell-backed implementations; tests pass
/// the mocks.
pub struct Peripherals {
    pub runner: Arc<dyn BenchRunner>,
    pub sysfs: Arc<dyn Sysfs>,
    pub gpio: Arc<dyn GpioBank>,
    pub adc: Arc<dyn AdcSampler>,
}

/// Senders the test fixture feeds edge events into.
pub struct FixtureHandles {
    pub ir_events: mpsc::Sender<EdgeEvent>,
    pub misc_events: mpsc::Sender<EdgeEvent>,
}

/// Assemble the full probe set from configuration.
///
/// Returns the populated table plus the fixture-side event handles.
/// Call [`DispatchTable::init_all`] afterwards to run staged group init.
pub fn build_table(
    config: ControllerConfig,
    peripherals: Peripherals,
) -> (DispatchTable, FixtureHandles) {
    let mut table = DispatchTable::new(RouteTable::default());

    let storage_engine = Arc::new(BenchEngine::new(peripherals.runner.clone(), config.storage));
    table.register(
        TestKind::Command,
        Group::Storage,
        AnyProbe::Bench(BenchProbe::new("storage", storage_engine)),
    );

    let usb_engine = Arc::new(BenchEngine::new(peripherals.runner.clone(), config.usb));
    table.register(
        TestKind::Command,
        Group::Usb,
        AnyProbe::Bench(BenchProbe::new("usb", usb_engine)),
    );

    table.register(
        TestKind::Command,
        Group::System,
        AnyProbe::System(SystemProbe::new(peripherals.sysfs.clone(), config.system)),
    );

    table.register(
        TestKind::Command,
        Group::Hdmi,
        AnyProbe::Hdmi(HdmiProbe::new(peripherals.sysfs.clone(), config.hdmi)),
    );

    table.register(
        TestKind::Command,
        Group::Adc,
        AnyProbe::Adc(AdcProbe::new(peripherals.adc.clone(), config.adc)),
    );

    table.register(
        TestKind::Command,
        Group::Led,
        AnyProbe::Toggle(ToggleProbe::new("led", peripherals.sysfs.clone(), config.led)),
    );

    table.register(
        TestKind::Command,
        Group::Pwm,
        AnyProbe::Toggle(ToggleProbe::new("pwm", peripherals.sysfs.clone(), config.pwm)),
    );

    let (header_probe, commanded) =
        HeaderProbe::new(peripherals.gpio.clone(), config.header.clone());
    table.register(TestKind::Command, Group::Header, AnyProbe::Header(header_probe));

    table.register(
        TestKind::Verify,
        Group::Header,
        AnyProbe::Verify(VerifyProbe::new(
            peripherals.adc.clone(),
            peripherals.gpio.clone(),
            config.header,
            config.verify,
            commanded,
        )),
    );

    let (ir_probe, ir_events) = EventProbe::channel("ir", config.ir_required_edges);
    table.register(TestKind::Command, Group::Ir, AnyProbe::Event(ir_probe));

    let (misc_probe, misc_events) = EventProbe::channel("misc", config.misc_required_edges);
    table.register(TestKind::Command, Group::Misc, AnyProbe::Event(misc_probe));

    debug!(
        probes = table.probe_count(),
        verify_gid = VERIFY_HEADER_GID,
        "dispatch table assembled"
    );

    (table, FixtureHandles {
        ir_events,
        misc_events,
    })
}
