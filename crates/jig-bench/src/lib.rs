//! Probe cache / asynchronous measurement engine for slow benchmarks.
//!
//! Storage and USB throughput checks invoke an external read/write
//! benchmark that takes seconds per run, while the factory host polls
//! every group repeatedly. This crate amortizes those measurements across
//! requests: per-device caching with a never-re-measure-once-passing
//! policy, one background task per device, bounded waits and bounded
//! retries. See [`engine::BenchEngine`] for the semantics.

pub mod engine;
pub mod probe;

pub use engine::{BenchEngine, BenchSlotConfig};
pub use probe::BenchProbe;
