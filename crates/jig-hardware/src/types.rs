//! Value types shared by probes and collaborators.

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a throughput benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchMode {
    Read,
    Write,
}

impl BenchMode {
    /// Index into per-mode arrays (cached values, thresholds).
    #[inline]
    #[must_use]
    pub fn as_index(self) -> usize {
        match self {
            BenchMode::Read => 0,
            BenchMode::Write => 1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BenchMode::Read => "read",
            BenchMode::Write => "write",
        }
    }
}

impl fmt::Display for BenchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed throughput sample returned by a [`BenchRunner`](crate::traits::BenchRunner).
///
/// The runner owns whatever text scraping its external utility requires;
/// the core only ever sees this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// Throughput in MB/s.
    pub mb_per_sec: i32,

    /// When the sample was taken.
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl Measurement {
    /// Create a measurement stamped with the current time.
    #[must_use]
    pub fn new(mb_per_sec: i32) -> Self {
        Measurement {
            mb_per_sec,
            captured_at: chrono::Utc::now(),
        }
    }
}

/// Minimum acceptable throughput per direction (MB/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub read: i32,
    pub write: i32,
}

impl Thresholds {
    /// Threshold for the given benchmark direction.
    #[inline]
    #[must_use]
    pub fn for_mode(self, mode: BenchMode) -> i32 {
        match mode {
            BenchMode::Read => self.read,
            BenchMode::Write => self.write,
        }
    }
}

/// Acceptance band for a sampled value.
///
/// Pass iff `min < value < max` — a strict open interval. Boundary-equal
/// samples fail so a signal sitting exactly on a limit cannot flap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub max: i32,
    pub min: i32,
}

impl Band {
    pub fn new(max: i32, min: i32) -> Self {
        Band { max, min }
    }

    /// Strict open-interval membership.
    #[inline]
    #[must_use]
    pub fn contains(self, value: i32) -> bool {
        value > self.min && value < self.max
    }
}

/// Compact 2-bit pin-pair code used by header pattern tables.
///
/// Each connector position carries two logically independent pin rails
/// (the odd- and even-numbered pins of the pair); one code describes both:
/// the high bit is the odd-pin level, the low bit the even-pin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinCode(u8);

impl PinCode {
    /// Create a pin-pair code with validation.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidData` for codes above 3.
    pub fn new(code: u8) -> Result<Self> {
        if code > 3 {
            return Err(HardwareError::invalid_data(format!(
                "Pin-pair code must be 0-3, got {code}"
            )));
        }
        Ok(PinCode(code))
    }

    /// Expand into (odd pin level, even pin level).
    #[inline]
    #[must_use]
    pub fn levels(self) -> (u8, u8) {
        ((self.0 >> 1) & 1, self.0 & 1)
    }

    /// Raw 2-bit code.
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

/// One connector position: the sysfs gpio numbers of the odd/even pins.
///
/// `None` marks a pin that is not software-controllable (power, ground,
/// dedicated function).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PinPair {
    pub odd: Option<u16>,
    pub even: Option<u16>,
}

impl PinPair {
    pub fn new(odd: Option<u16>, even: Option<u16>) -> Self {
        PinPair { odd, even }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bench_mode_index() {
        assert_eq!(BenchMode::Read.as_index(), 0);
        assert_eq!(BenchMode::Write.as_index(), 1);
    }

    #[test]
    fn thresholds_per_mode() {
        let t = Thresholds { read: 50, write: 20 };
        assert_eq!(t.for_mode(BenchMode::Read), 50);
        assert_eq!(t.for_mode(BenchMode::Write), 20);
    }

    #[rstest]
    #[case(1400, 1340, 1358, true)]
    #[case(1400, 1340, 1400, false)] // boundary-equal fails
    #[case(1400, 1340, 1340, false)] // boundary-equal fails
    #[case(1400, 1340, 1401, false)]
    #[case(1400, 1340, 1339, false)]
    fn band_open_interval(
        #[case] max: i32,
        #[case] min: i32,
        #[case] sample: i32,
        #[case] pass: bool,
    ) {
        assert_eq!(Band::new(max, min).contains(sample), pass);
    }

    #[rstest]
    #[case(0, (0, 0))]
    #[case(1, (0, 1))]
    #[case(2, (1, 0))]
    #[case(3, (1, 1))]
    fn pin_code_levels(#[case] code: u8, #[case] expected: (u8, u8)) {
        assert_eq!(PinCode::new(code).unwrap().levels(), expected);
    }

    #[test]
    fn pin_code_range() {
        assert!(PinCode::new(3).is_ok());
        assert!(PinCode::new(4).is_err());
    }

    #[test]
    fn config_types_deserialize() {
        let thresholds: Thresholds = serde_json::from_str(r#"{"read":140,"write":70}"#).unwrap();
        assert_eq!(thresholds.for_mode(BenchMode::Read), 140);

        let band: Band = serde_json::from_str(r#"{"max":1400,"min":1340}"#).unwrap();
        assert!(band.contains(1358));

        let pair: PinPair = serde_json::from_str(r#"{"odd":14,"even":null}"#).unwrap();
        assert_eq!(pair, PinPair::new(Some(14), None));
    }
}
