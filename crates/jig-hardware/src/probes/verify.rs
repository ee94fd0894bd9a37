//! Verification pass — the confirm half of the two-phase header check.
//!
//! A confirm never mutates probe state and never re-issues the act; it is
//! a pure comparison of an externally observed signal against the bounds
//! associated with the currently commanded pattern:
//!
//! - base 0: sample the ADC channel wired to the header and compare the
//!   millivolts against the commanded pattern's acceptance band (strict
//!   open interval).
//! - base 1: read back every controllable pin and count mismatches
//!   against the commanded pattern's expected levels.
//!
//! Invoked before any pattern has been commanded, both report `Pending`.

use crate::{
    error::Result,
    probes::header::{CommandedPattern, HeaderLayout},
    traits::{AdcSampler, GpioBank, Probe},
    types::{Band, PinCode},
};
use jig_core::{ProbeReply, RawDeviceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Configuration of the confirm pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// ADC channel wired to the header sense line.
    pub channel: u8,
    /// Acceptance band per pattern index, in millivolts.
    pub bands: Vec<Band>,
}

/// Probe for the verify route of the header group.
pub struct VerifyProbe {
    sampler: Arc<dyn AdcSampler>,
    bank: Arc<dyn GpioBank>,
    layout: HeaderLayout,
    config: VerifyConfig,
    commanded: CommandedPattern,
}

impl VerifyProbe {
    pub fn new(
        sampler: Arc<dyn AdcSampler>,
        bank: Arc<dyn GpioBank>,
        layout: HeaderLayout,
        config: VerifyConfig,
        commanded: CommandedPattern,
    ) -> Self {
        VerifyProbe {
            sampler,
            bank,
            layout,
            config,
            commanded,
        }
    }

    fn commanded_pattern(&self) -> Option<u8> {
        *self.commanded.lock().unwrap()
    }

    fn confirm_voltage(&self, pattern: u8) -> ProbeReply {
        let Some(band) = self.config.bands.get(pattern as usize) else {
            return ProbeReply::fail_int(0);
        };
        match self.sampler.sample_mv(self.config.channel) {
            Ok(mv) if band.contains(mv) => ProbeReply::pass_int(mv),
            Ok(mv) => ProbeReply::fail_int(mv),
            Err(_) => ProbeReply::fail_int(0),
        }
    }

    fn confirm_pins(&self, pattern: u8) -> ProbeReply {
        let expected = self.layout.driven_levels(pattern as usize);
        if expected.is_empty() {
            return ProbeReply::fail_int(0);
        }

        let mut mismatches = 0i32;
        for (pin, level) in expected {
            let observed = self.bank.read_level(pin).unwrap_or(0);
            if observed != level {
                mismatches += 1;
            }
        }

        if mismatches == 0 {
            ProbeReply::pass_int(0)
        } else {
            ProbeReply::fail_int(mismatches)
        }
    }
}

impl Probe for VerifyProbe {
    async fn init(&mut self) -> Result<()> {
        debug!(
            channel = self.config.channel,
            bands = self.config.bands.len(),
            "verify route ready"
        );
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        let Some(pattern) = self.commanded_pattern() else {
            return ProbeReply::pending_int(0);
        };
        match addr.base {
            0 => self.confirm_voltage(pattern),
            1 => self.confirm_pins(pattern),
            _ => ProbeReply::fail_int(0),
        }
    }
}

/// Expand compact pin-pair codes into interleaved per-pin levels.
///
/// Each code covers one connector position; the output is
/// `[odd0, even0, odd1, even1, ...]`.
#[must_use]
pub fn expand_pin_codes(codes: &[PinCode]) -> Vec<u8> {
    let mut out = Vec::with_capacity(codes.len() * 2);
    for code in codes {
        let (odd, even) = code.levels();
        out.push(odd);
        out.push(even);
    }
    out
}

/// Count positions where observed pin levels differ from expected.
///
/// Lengths are compared positionally; a truncated observation counts every
/// missing pin as a mismatch.
#[must_use]
pub fn pin_mismatches(expected: &[u8], observed: &[u8]) -> usize {
    let common = expected
        .iter()
        .zip(observed)
        .filter(|(e, o)| e != o)
        .count();
    common + expected.len().saturating_sub(observed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAdcSampler, MockGpioBank};
    use crate::probes::header::{HeaderProbe, stock_patterns};
    use crate::types::PinPair;
    use jig_core::{Action, ProbeAddress, ProbeStatus};

    fn small_layout() -> HeaderLayout {
        HeaderLayout {
            pairs: vec![
                PinPair::new(Some(7), Some(8)),
                PinPair::new(Some(11), Some(12)),
            ],
            patterns: stock_patterns(2),
        }
    }

    fn bands() -> Vec<Band> {
        vec![
            Band::new(1900, 1700), // all high
            Band::new(120, -1),    // all low
            Band::new(1000, 800),  // cross 0
            Band::new(1000, 800),  // cross 1
        ]
    }

    struct Rig {
        header: HeaderProbe,
        verify: VerifyProbe,
        bank: Arc<MockGpioBank>,
        sampler: Arc<MockAdcSampler>,
    }

    fn rig() -> Rig {
        let bank = Arc::new(MockGpioBank::new());
        let sampler = Arc::new(MockAdcSampler::new());
        let (header, commanded) = HeaderProbe::new(bank.clone(), small_layout());
        let verify = VerifyProbe::new(
            sampler.clone(),
            bank.clone(),
            small_layout(),
            VerifyConfig {
                channel: 2,
                bands: bands(),
            },
            commanded,
        );
        Rig {
            header,
            verify,
            bank,
            sampler,
        }
    }

    fn pattern_raw(p: u16) -> RawDeviceId {
        ProbeAddress { base: 0, action: Action(p) }.compose()
    }

    fn confirm_raw(base: u8) -> RawDeviceId {
        ProbeAddress { base, action: Action(0) }.compose()
    }

    #[tokio::test]
    async fn confirm_before_any_command_is_pending() {
        let mut r = rig();
        let reply = r.verify.check(confirm_raw(0)).await;
        assert_eq!(reply.status, ProbeStatus::Pending);
    }

    #[tokio::test]
    async fn voltage_confirm_passes_inside_band() {
        let mut r = rig();
        r.header.check(pattern_raw(0)).await;
        r.sampler.set_mv(2, 1800);

        let reply = r.verify.check(confirm_raw(0)).await;
        assert_eq!(reply, ProbeReply::pass_int(1800));
    }

    #[tokio::test]
    async fn voltage_confirm_fails_on_boundary() {
        let mut r = rig();
        r.header.check(pattern_raw(0)).await;

        r.sampler.set_mv(2, 1900); // == max
        assert_eq!(r.verify.check(confirm_raw(0)).await.status, ProbeStatus::Fail);

        r.sampler.set_mv(2, 1700); // == min
        assert_eq!(r.verify.check(confirm_raw(0)).await.status, ProbeStatus::Fail);
    }

    #[tokio::test]
    async fn pin_confirm_passes_when_readback_matches() {
        let mut r = rig();
        r.header.check(pattern_raw(2)).await;

        let reply = r.verify.check(confirm_raw(1)).await;
        assert_eq!(reply, ProbeReply::pass_int(0));
    }

    #[tokio::test]
    async fn pin_confirm_counts_single_stuck_pin() {
        let mut r = rig();
        r.header.check(pattern_raw(2)).await;
        // cross-0 drives pin 12 low; force it stuck high.
        r.bank.force_level(12, 1);

        let reply = r.verify.check(confirm_raw(1)).await;
        assert_eq!(reply, ProbeReply::fail_int(1));
    }

    #[tokio::test]
    async fn confirm_never_redrives_pins() {
        let mut r = rig();
        r.header.check(pattern_raw(1)).await; // all low
        r.bank.force_level(7, 1);

        r.verify.check(confirm_raw(1)).await;
        // Still the forced value: the confirm read, it did not re-drive.
        assert_eq!(r.bank.level(7), Some(1));
    }

    #[test]
    fn expand_codes_interleaves_pairs() {
        let codes = [PinCode::new(2).unwrap(), PinCode::new(2).unwrap()];
        assert_eq!(expand_pin_codes(&codes), vec![1, 0, 1, 0]);
    }

    #[test]
    fn mismatch_count_scenario() {
        // expected [1,0,1,0] vs observed [1,0,1,1] -> exactly one mismatch
        let expected = [1u8, 0, 1, 0];
        let observed = [1u8, 0, 1, 1];
        assert_eq!(pin_mismatches(&expected, &observed), 1);
    }

    #[test]
    fn mismatch_count_truncated_observation() {
        let expected = [1u8, 0, 1, 0];
        let observed = [1u8, 0];
        assert_eq!(pin_mismatches(&expected, &observed), 2);
    }
}
