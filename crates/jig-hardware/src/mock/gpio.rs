//! Mock GPIO bank.

use crate::{Result, error::HardwareError, traits::GpioBank};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory [`GpioBank`] recording exports and driven levels.
///
/// Reading an exported but never-driven pin returns 0, like a real bank
/// with pull-downs. Tests can override observed levels with
/// [`force_level`](MockGpioBank::force_level) to simulate a shorted or
/// stuck pin.
#[derive(Debug, Default)]
pub struct MockGpioBank {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    exported: HashSet<u16>,
    levels: HashMap<u16, u8>,
}

impl MockGpioBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pin has been exported.
    pub fn is_exported(&self, pin: u16) -> bool {
        self.inner.lock().unwrap().exported.contains(&pin)
    }

    /// Number of exported pins.
    pub fn exported_count(&self) -> usize {
        self.inner.lock().unwrap().exported.len()
    }

    /// Last driven level of a pin, if any.
    pub fn level(&self, pin: u16) -> Option<u8> {
        self.inner.lock().unwrap().levels.get(&pin).copied()
    }

    /// Override the level a readback will observe, independent of what was
    /// driven. Simulates a stuck or shorted pin.
    pub fn force_level(&self, pin: u16, level: u8) {
        self.inner.lock().unwrap().levels.insert(pin, level);
    }
}

impl GpioBank for MockGpioBank {
    fn export(&self, pin: u16) -> Result<()> {
        self.inner.lock().unwrap().exported.insert(pin);
        Ok(())
    }

    fn drive(&self, pin: u16, level: u8) -> Result<()> {
        if level > 1 {
            return Err(HardwareError::invalid_data(format!(
                "GPIO level must be 0/1, got {level}"
            )));
        }
        self.inner.lock().unwrap().levels.insert(pin, level);
        Ok(())
    }

    fn read_level(&self, pin: u16) -> Result<u8> {
        Ok(self.inner.lock().unwrap().levels.get(&pin).copied().unwrap_or(0))
    }
}
