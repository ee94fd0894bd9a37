//! Typed controller configuration.
//!
//! One document configures every probe group. The legacy per-group
//! comma-separated config lines are out of scope; this typed form is the
//! already-parsed input that group init receives, loadable from JSON.
//! Defaults carry the stock single-board tables (device paths, throughput
//! thresholds, ADC bands, header layout).

use jig_bench::BenchSlotConfig;
use jig_core::{Error, Result};
use jig_hardware::{
    probes::{
        AdcChannelConfig, HeaderLayout, MatchNodeConfig, SystemConfig, ToggleTargetConfig,
        VerifyConfig, header::stock_patterns,
    },
    types::{Band, PinPair, Thresholds},
};
use serde::{Deserialize, Serialize};

/// Complete configuration for one controller instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub storage: Vec<BenchSlotConfig>,
    pub usb: Vec<BenchSlotConfig>,
    pub system: SystemConfig,
    pub hdmi: Vec<MatchNodeConfig>,
    pub adc: Vec<AdcChannelConfig>,
    pub led: Vec<ToggleTargetConfig>,
    pub pwm: Vec<ToggleTargetConfig>,
    pub header: HeaderLayout,
    pub verify: VerifyConfig,
    /// IR keypress edges that must be exceeded before the ir check passes.
    pub ir_required_edges: u32,
    /// Edge count for the misc group (button/jack detect); 0 means any
    /// single edge passes.
    pub misc_required_edges: u32,
}

impl ControllerConfig {
    /// Load a configuration document from JSON.
    ///
    /// # Errors
    /// Returns `Error::Config` when the document does not deserialize.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serialize to pretty JSON, the form written next to the jig for
    /// per-board overrides.
    ///
    /// # Errors
    /// Returns `Error::Config` when serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            storage: vec![
                bench_slot("eMMC", "/dev/mmcblk0", 140, 70, None),
                bench_slot("uSD", "/dev/mmcblk1", 50, 20, None),
                bench_slot("SATA", "/dev/sda", 250, 150, None),
                bench_slot("NVMe", "/dev/nvme0n1", 250, 150, None),
            ],
            usb: vec![
                bench_slot("USB 3.0", "/sys/bus/usb/devices/8-1", 100, 35, Some(5000)),
                bench_slot("USB 2.0", "/sys/bus/usb/devices/2-1", 25, 20, Some(480)),
                bench_slot("USB OTG", "/sys/bus/usb/devices/5-1", 25, 20, Some(480)),
                bench_slot("USB Header", "/sys/bus/usb/devices/1-1", 25, 20, Some(480)),
            ],
            system: SystemConfig {
                mem_node: "/sys/firmware/board/mem_mb".to_string(),
                mem_expect_mb: 0,
                fb_node: "/sys/class/graphics/fb0/virtual_size".to_string(),
                fb_expect_x: 1920,
                fb_expect_y: 1080,
            },
            hdmi: vec![
                MatchNodeConfig {
                    path: "/sys/devices/platform/display-subsystem/drm/card0/card0-HDMI-A-1/edid"
                        .to_string(),
                    expect: "00FFFFFFFFFFFF00".to_string(),
                },
                MatchNodeConfig {
                    path: "/sys/devices/platform/display-subsystem/drm/card0/card0-HDMI-A-1/status"
                        .to_string(),
                    expect: "connected".to_string(),
                },
            ],
            adc: vec![
                // Header 37 sense line, const 1.358V.
                AdcChannelConfig {
                    channel: 3,
                    band: Band::new(1400, 1340),
                },
                // Header 40 sense line, const 0.441V.
                AdcChannelConfig {
                    channel: 2,
                    band: Band::new(490, 430),
                },
            ],
            led: vec![
                // Power LED is active-low.
                ToggleTargetConfig {
                    path: "/sys/class/leds/power/brightness".to_string(),
                    set: "0".to_string(),
                    clear: "255".to_string(),
                },
                ToggleTargetConfig {
                    path: "/sys/class/leds/work/brightness".to_string(),
                    set: "255".to_string(),
                    clear: "0".to_string(),
                },
            ],
            pwm: vec![
                ToggleTargetConfig {
                    path: "/sys/devices/platform/pwm-fan/hwmon/hwmon0/pwm0_enable".to_string(),
                    set: "1".to_string(),
                    clear: "0".to_string(),
                },
                ToggleTargetConfig {
                    path: "/sys/devices/platform/pwm-fan/hwmon/hwmon0/pwm1_enable".to_string(),
                    set: "1".to_string(),
                    clear: "0".to_string(),
                },
            ],
            header: stock_header_layout(),
            verify: VerifyConfig {
                channel: 2,
                bands: vec![
                    Band::new(1900, 1700), // all high
                    Band::new(120, -1),    // all low
                    Band::new(1000, 800),  // cross 0
                    Band::new(1000, 800),  // cross 1
                ],
            },
            ir_required_edges: 5,
            misc_required_edges: 0,
        }
    }
}

fn bench_slot(
    name: &str,
    path: &str,
    read: i32,
    write: i32,
    link_speed: Option<i32>,
) -> BenchSlotConfig {
    BenchSlotConfig {
        name: name.to_string(),
        path: path.to_string(),
        thresholds: Thresholds { read, write },
        link_speed,
    }
}

/// Stock 40-pin header layout: sysfs gpio numbers per connector position,
/// `None` for power/ground/dedicated pins.
fn stock_header_layout() -> HeaderLayout {
    let pairs = vec![
        PinPair::new(None, None),           // 01: 3.3V      02: 5.0V
        PinPair::new(Some(110), None),      // 03: I2C_SDA1  04: 5.0V
        PinPair::new(Some(109), None),      // 05: I2C_SCL1  06: GND
        PinPair::new(Some(14), Some(68)),   // 07            08
        PinPair::new(None, Some(67)),       // 09: GND       10
        PinPair::new(Some(16), Some(71)),   // 11            12
        PinPair::new(Some(17), None),       // 13            14: GND
        PinPair::new(Some(18), Some(77)),   // 15            16
        PinPair::new(None, Some(78)),       // 17: 3.3V      18
        PinPair::new(Some(113), None),      // 19            20: GND
        PinPair::new(Some(114), Some(72)),  // 21            22
        PinPair::new(Some(115), Some(97)),  // 23            24
        PinPair::new(None, Some(73)),       // 25: GND       26
        PinPair::new(Some(12), Some(11)),   // 27            28
        PinPair::new(Some(80), None),       // 29            30: GND
        PinPair::new(Some(79), Some(74)),   // 31            32
        PinPair::new(Some(13), None),       // 33            34: GND
        PinPair::new(Some(69), Some(70)),   // 35            36
        PinPair::new(None, None),           // 37: ADC.AIN1  38: 1.8V
        PinPair::new(None, None),           // 39: PWRBTN    40: ADC.AIN0
    ];
    let patterns = stock_patterns(pairs.len());
    HeaderLayout { pairs, patterns }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_shape() {
        let config = ControllerConfig::default();
        assert_eq!(config.storage.len(), 4);
        assert_eq!(config.usb.len(), 4);
        assert_eq!(config.adc.len(), 2);
        assert_eq!(config.header.pairs.len(), 20);
        assert_eq!(config.header.patterns.len(), 4);
        assert_eq!(config.verify.bands.len(), 4);
    }

    #[test]
    fn every_usb_slot_has_a_link_speed() {
        let config = ControllerConfig::default();
        assert!(config.usb.iter().all(|slot| slot.link_speed.is_some()));
        assert!(config.storage.iter().all(|slot| slot.link_speed.is_none()));
    }

    #[test]
    fn json_roundtrip() {
        let config = ControllerConfig::default();
        let json = config.to_json().unwrap();
        let reloaded = ControllerConfig::from_json(&json).unwrap();
        assert_eq!(reloaded.storage.len(), config.storage.len());
        assert_eq!(reloaded.verify.channel, config.verify.channel);
        assert_eq!(reloaded.ir_required_edges, 5);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = ControllerConfig::from_json("{ not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn pattern_rows_cover_every_pair() {
        let layout = stock_header_layout();
        for row in &layout.patterns {
            assert_eq!(row.len(), layout.pairs.len());
        }
    }
}
