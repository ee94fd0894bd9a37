//! Mock sysfs node tree.

use crate::{Result, error::HardwareError, traits::Sysfs};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`Sysfs`] backed by a path → contents map.
///
/// # Examples
///
/// ```
/// use jig_hardware::mock::MockSysfs;
/// use jig_hardware::traits::Sysfs;
///
/// let fs = MockSysfs::new();
/// fs.insert("/sys/class/leds/work/brightness", "0");
///
/// fs.write("/sys/class/leds/work/brightness", "255").unwrap();
/// assert_eq!(fs.read("/sys/class/leds/work/brightness").unwrap(), "255");
/// ```
#[derive(Debug, Default)]
pub struct MockSysfs {
    nodes: Mutex<HashMap<String, String>>,
}

impl MockSysfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a node.
    pub fn insert(&self, path: &str, contents: &str) {
        self.nodes
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_string());
    }

    /// Remove a node, simulating absent hardware.
    pub fn remove(&self, path: &str) {
        self.nodes.lock().unwrap().remove(path);
    }
}

impl Sysfs for MockSysfs {
    fn exists(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &str) -> Result<String> {
        self.nodes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| HardwareError::absent(path))
    }

    fn write(&self, path: &str, value: &str) -> Result<()> {
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get_mut(path) {
            Some(contents) => {
                *contents = value.to_string();
                Ok(())
            }
            None => Err(HardwareError::absent(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_node_is_absent() {
        let fs = MockSysfs::new();
        assert!(!fs.exists("/sys/nope"));
        assert!(matches!(
            fs.read("/sys/nope"),
            Err(HardwareError::Absent { .. })
        ));
    }

    #[test]
    fn write_updates_existing_node_only() {
        let fs = MockSysfs::new();
        fs.insert("/sys/node", "a");
        fs.write("/sys/node", "b").unwrap();
        assert_eq!(fs.read("/sys/node").unwrap(), "b");

        assert!(fs.write("/sys/other", "x").is_err());
    }

    #[test]
    fn remove_simulates_unplug() {
        let fs = MockSysfs::new();
        fs.insert("/sys/node", "a");
        fs.remove("/sys/node");
        assert!(!fs.exists("/sys/node"));
    }
}
