//! Mock ADC sampler.

use crate::{Result, error::HardwareError, traits::AdcSampler};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`AdcSampler`] returning preset millivolt readings.
#[derive(Debug, Default)]
pub struct MockAdcSampler {
    readings: Mutex<HashMap<u8, i32>>,
}

impl MockAdcSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the millivolts the channel will report.
    pub fn set_mv(&self, channel: u8, mv: i32) {
        self.readings.lock().unwrap().insert(channel, mv);
    }

    /// Remove the channel, simulating absent hardware.
    pub fn remove_channel(&self, channel: u8) {
        self.readings.lock().unwrap().remove(&channel);
    }
}

impl AdcSampler for MockAdcSampler {
    fn sample_mv(&self, channel: u8) -> Result<i32> {
        self.readings
            .lock()
            .unwrap()
            .get(&channel)
            .copied()
            .ok_or_else(|| HardwareError::absent(format!("adc channel {channel}")))
    }
}
