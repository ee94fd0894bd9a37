//! Mock throughput benchmark runner.

use crate::{
    Result,
    error::HardwareError,
    traits::BenchRunner,
    types::{BenchMode, Measurement},
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock [`BenchRunner`] with scripted results and instrumentation.
///
/// Results are queued per (path, mode); each `measure` call pops the next
/// scripted value, and the last value is repeated when the queue runs dry.
/// The mock counts every call and tracks the maximum number of
/// measurements in flight at once, which is what the engine's idempotence
/// and mutual-exclusion tests assert on.
///
/// # Examples
///
/// ```
/// use jig_hardware::mock::MockBenchRunner;
/// use jig_hardware::types::BenchMode;
/// use jig_hardware::traits::BenchRunner;
///
/// let runner = MockBenchRunner::new();
/// runner.add_device("/dev/mmcblk0");
/// runner.script_result("/dev/mmcblk0", BenchMode::Read, 60);
///
/// let m = runner.measure("/dev/mmcblk0", BenchMode::Read).unwrap();
/// assert_eq!(m.mb_per_sec, 60);
/// assert_eq!(runner.call_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockBenchRunner {
    inner: Mutex<Inner>,

    /// Total measure() invocations.
    calls: AtomicUsize,

    /// Measurements currently executing.
    in_flight: AtomicUsize,

    /// High-water mark of concurrent measurements.
    max_in_flight: AtomicUsize,
}

#[derive(Debug, Default)]
struct Inner {
    present: HashSet<String>,
    results: HashMap<(String, BenchMode), VecDeque<i32>>,
    link_speeds: HashMap<String, i32>,
    /// Artificial measurement duration, to widen race windows in tests.
    delay: Option<Duration>,
}

impl MockBenchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a device path as present.
    pub fn add_device(&self, path: &str) {
        self.inner.lock().unwrap().present.insert(path.to_string());
    }

    /// Queue the next scripted measurement value for (path, mode).
    pub fn script_result(&self, path: &str, mode: BenchMode, mb_per_sec: i32) {
        self.inner
            .lock()
            .unwrap()
            .results
            .entry((path.to_string(), mode))
            .or_default()
            .push_back(mb_per_sec);
    }

    /// Set the link speed reported for a device path.
    pub fn set_link_speed(&self, path: &str, speed: i32) {
        self.inner
            .lock()
            .unwrap()
            .link_speeds
            .insert(path.to_string(), speed);
    }

    /// Make every measurement take at least this long.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    /// Total number of measure() calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of measurements that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_result(&self, path: &str, mode: BenchMode) -> i32 {
        let mut inner = self.inner.lock().unwrap();
        let queue = inner.results.get_mut(&(path.to_string(), mode));
        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(0),
            Some(queue) => queue.front().copied().unwrap_or(0),
            None => 0,
        }
    }
}

impl BenchRunner for MockBenchRunner {
    fn is_present(&self, path: &str) -> bool {
        self.inner.lock().unwrap().present.contains(path)
    }

    fn measure(&self, path: &str, mode: BenchMode) -> Result<Measurement> {
        if !self.is_present(path) {
            return Err(HardwareError::absent(path));
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_running, Ordering::SeqCst);

        let delay = self.inner.lock().unwrap().delay;
        if let Some(delay) = delay {
            // Runs on a blocking thread, same as a real dd invocation.
            std::thread::sleep(delay);
        }

        let value = self.next_result(path, mode);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Measurement::new(value))
    }

    fn link_speed(&self, path: &str) -> Result<i32> {
        if !self.is_present(path) {
            return Err(HardwareError::absent(path));
        }
        self.inner
            .lock()
            .unwrap()
            .link_speeds
            .get(path)
            .copied()
            .ok_or_else(|| HardwareError::unsupported(format!("link_speed for {path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_device_refuses_to_measure() {
        let runner = MockBenchRunner::new();
        let result = runner.measure("/dev/none", BenchMode::Read);
        assert!(matches!(result, Err(HardwareError::Absent { .. })));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn scripted_results_pop_in_order_then_repeat() {
        let runner = MockBenchRunner::new();
        runner.add_device("/dev/sda");
        runner.script_result("/dev/sda", BenchMode::Read, 30);
        runner.script_result("/dev/sda", BenchMode::Read, 60);

        assert_eq!(runner.measure("/dev/sda", BenchMode::Read).unwrap().mb_per_sec, 30);
        assert_eq!(runner.measure("/dev/sda", BenchMode::Read).unwrap().mb_per_sec, 60);
        // Queue exhausted to its last entry; it repeats.
        assert_eq!(runner.measure("/dev/sda", BenchMode::Read).unwrap().mb_per_sec, 60);
        assert_eq!(runner.call_count(), 3);
    }

    #[test]
    fn unscripted_mode_measures_zero() {
        let runner = MockBenchRunner::new();
        runner.add_device("/dev/sda");
        assert_eq!(runner.measure("/dev/sda", BenchMode::Write).unwrap().mb_per_sec, 0);
    }

    #[test]
    fn link_speed_scripted_and_unsupported() {
        let runner = MockBenchRunner::new();
        runner.add_device("/sys/bus/usb/devices/8-1");
        runner.set_link_speed("/sys/bus/usb/devices/8-1", 5000);

        assert_eq!(runner.link_speed("/sys/bus/usb/devices/8-1").unwrap(), 5000);

        runner.add_device("/dev/mmcblk0");
        assert!(matches!(
            runner.link_speed("/dev/mmcblk0"),
            Err(HardwareError::Unsupported { .. })
        ));
    }
}
