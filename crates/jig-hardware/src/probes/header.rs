//! Header pattern probe — the act half of the two-phase header check.
//!
//! `check` only commands a physical change: it drives every controllable
//! pin of the 40-pin header to the levels of the selected pattern and
//! records which pattern is currently commanded. Confirming that the
//! pattern actually appeared on the pins is a separate, independent pass
//! (see [`verify`](crate::probes::verify)).

use crate::{
    error::Result,
    traits::{GpioBank, Probe},
    types::{PinCode, PinPair},
};
use jig_core::{ProbeReply, RawDeviceId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Shared record of the currently commanded pattern index.
///
/// Written by [`HeaderProbe`], read (never written) by the verify pass.
pub type CommandedPattern = Arc<Mutex<Option<u8>>>;

/// Connector layout plus its test patterns.
///
/// `pairs[i]` describes connector position `i` (pins `2i+1` / `2i+2`);
/// `patterns[p][i]` is the 2-bit pin-pair code position `i` takes under
/// pattern `p`. Pattern rows must have one code per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderLayout {
    pub pairs: Vec<PinPair>,
    pub patterns: Vec<Vec<PinCode>>,
}

impl HeaderLayout {
    /// Number of defined patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Controllable pins with their target levels under a pattern.
    ///
    /// Positions whose pins are not software-controllable are skipped.
    #[must_use]
    pub fn driven_levels(&self, pattern: usize) -> Vec<(u16, u8)> {
        let Some(codes) = self.patterns.get(pattern) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (pair, code) in self.pairs.iter().zip(codes) {
            let (odd_level, even_level) = code.levels();
            if let Some(pin) = pair.odd {
                out.push((pin, odd_level));
            }
            if let Some(pin) = pair.even {
                out.push((pin, even_level));
            }
        }
        out
    }

    /// All controllable pins of the connector.
    #[must_use]
    pub fn controllable_pins(&self) -> Vec<u16> {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.odd, pair.even])
            .flatten()
            .collect()
    }
}

/// Probe for the header group.
pub struct HeaderProbe {
    bank: Arc<dyn GpioBank>,
    layout: HeaderLayout,
    commanded: CommandedPattern,
}

impl HeaderProbe {
    /// Create the probe and the shared commanded-pattern handle the verify
    /// pass reads.
    pub fn new(bank: Arc<dyn GpioBank>, layout: HeaderLayout) -> (Self, CommandedPattern) {
        let commanded: CommandedPattern = Arc::new(Mutex::new(None));
        let probe = HeaderProbe {
            bank,
            layout,
            commanded: commanded.clone(),
        };
        (probe, commanded)
    }
}

impl Probe for HeaderProbe {
    async fn init(&mut self) -> Result<()> {
        let pins = self.layout.controllable_pins();
        for &pin in &pins {
            self.bank.export(pin)?;
        }
        debug!(pins = pins.len(), patterns = self.layout.pattern_count(), "header group ready");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        // Base 0 is the whole-header pattern test; per-pin control is not
        // part of this group's wire contract.
        if addr.base != 0 {
            return ProbeReply::fail_int(0);
        }

        let pattern = addr.action.index() as usize;
        if pattern >= self.layout.pattern_count() {
            return ProbeReply::fail_int(pattern as i32);
        }

        for (pin, level) in self.layout.driven_levels(pattern) {
            if let Err(e) = self.bank.drive(pin, level) {
                warn!(pin, level, error = %e, "header pattern drive failed");
                return ProbeReply::fail_int(pattern as i32);
            }
        }

        *self.commanded.lock().unwrap() = Some(pattern as u8);
        ProbeReply::pending_int(pattern as i32)
    }
}

/// The four stock patterns: all-high, all-low, cross-0, cross-1.
///
/// `cross` alternates levels between adjacent controllable positions so a
/// short between neighboring pins shows up as a mismatch.
#[must_use]
pub fn stock_patterns(pair_count: usize) -> Vec<Vec<PinCode>> {
    let code = |c: u8| PinCode::new(c).expect("stock codes are 0-3");
    let all_high = vec![code(3); pair_count];
    let all_low = vec![code(0); pair_count];
    let cross0: Vec<PinCode> = (0..pair_count)
        .map(|i| if i % 2 == 0 { code(1) } else { code(2) })
        .collect();
    let cross1: Vec<PinCode> = (0..pair_count)
        .map(|i| if i % 2 == 0 { code(2) } else { code(1) })
        .collect();
    vec![all_high, all_low, cross0, cross1]
}
