//! Concrete peripheral probes.
//!
//! Each probe implements the [`Probe`](crate::traits::Probe) contract for
//! one or two wire groups and performs its physical I/O exclusively through
//! injected collaborators. Probes whose measurements are slow (storage,
//! usb) live in the `jig-bench` crate on top of the measurement engine.

pub mod adc;
pub mod event;
pub mod hdmi;
pub mod header;
pub mod system;
pub mod toggle;
pub mod verify;

pub use adc::{AdcChannelConfig, AdcProbe};
pub use event::{EdgeEvent, EventProbe};
pub use hdmi::{HdmiProbe, MatchNodeConfig};
pub use header::{CommandedPattern, HeaderLayout, HeaderProbe};
pub use system::{SystemConfig, SystemProbe};
pub use toggle::{ToggleProbe, ToggleTargetConfig};
pub use verify::{VerifyConfig, VerifyProbe, expand_pin_codes, pin_mismatches};
