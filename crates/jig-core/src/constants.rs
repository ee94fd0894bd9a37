//! Protocol and engine constants for the jig test controller.
//!
//! The wire protocol is a fixed-width, comma-delimited ASCII frame exchanged
//! with the factory host over a serial-style link:
//!
//! ```text
//! @,<cmd:1>,<gid:2>,<raw:4>,<status:1>,<value:20>,#
//! ```
//!
//! Every field is padded to its declared width; the total frame length is a
//! compile-time constant and any deviation is a framing error. The result
//! fragment (`<status:1>,<value:20>`) is also recognized on its own, at its
//! own fixed width, for device-local replies.

// ============================================================================
// Frame markers and delimiters
// ============================================================================

/// Start-of-frame marker.
///
/// The first byte of every wire frame. Garbage received before this marker
/// is discarded by the stream codec.
pub const START_MARKER: u8 = b'@';

/// End-of-frame marker.
///
/// The last byte of every wire frame. A frame whose final byte is not this
/// marker is rejected outright.
pub const END_MARKER: u8 = b'#';

/// Field delimiter between every pair of frame fields.
pub const FIELD_DELIMITER: u8 = b',';

// ============================================================================
// Field widths
// ============================================================================

/// Command field width (a single ASCII character).
pub const COMMAND_WIDTH: usize = 1;

/// Group id field width. Group ids are zero-padded to 2 digits (00-99).
pub const GROUP_ID_WIDTH: usize = 2;

/// Raw device id field width. Raw ids are zero-padded to 4 digits (0000-9999).
pub const RAW_ID_WIDTH: usize = 4;

/// Status field width (a single ASCII character).
pub const STATUS_WIDTH: usize = 1;

/// Value field width.
///
/// Integer values are right-aligned, text values left-justified; the field
/// is space-padded to exactly this width either way.
pub const VALUE_WIDTH: usize = 20;

/// Result fragment length: `<status:1>,<value:20>`.
pub const FRAGMENT_LEN: usize = STATUS_WIDTH + 1 + VALUE_WIDTH;

/// Total wire frame length.
///
/// `@,<cmd>,<gid>,<raw>,<fragment>,#` with a delimiter after every field.
/// Producers must pad every field to its declared width and consumers must
/// reject any frame whose total length differs.
pub const FRAME_LEN: usize =
    1 + 1 + COMMAND_WIDTH + 1 + GROUP_ID_WIDTH + 1 + RAW_ID_WIDTH + 1 + FRAGMENT_LEN + 1 + 1;

// ============================================================================
// Status characters
// ============================================================================

/// Status character: check passed.
pub const STATUS_PASS: char = 'P';

/// Status character: check failed.
pub const STATUS_FAIL: char = 'F';

/// Status character: commanded / pending.
///
/// Used by act-type checks that only command a physical change, and by
/// verification passes invoked before the underlying hardware event has
/// occurred (e.g. a button not yet pressed).
pub const STATUS_PENDING: char = 'C';

/// Status character: init-phase result.
pub const STATUS_INIT: char = 'I';

// ============================================================================
// Device identity
// ============================================================================

/// Radix of the raw-device-id decomposition.
///
/// `base = raw % 10`, `action = raw / 10`. A group-local base id must be
/// below this value; ids at or above `10 * n` select actions, not devices.
pub const DEVICE_ID_RADIX: u16 = 10;

/// Maximum raw device id representable in the 4-digit wire field.
pub const MAX_RAW_DEVICE_ID: u16 = 9999;

/// Maximum group id representable in the 2-digit wire field.
pub const MAX_GROUP_ID: u8 = 99;

// ============================================================================
// Measurement engine bounds
// ============================================================================

/// Maximum measurement attempts per check before the engine gives up and
/// reports the last value obtained.
pub const BENCH_MAX_ATTEMPTS: u32 = 5;

/// Fixed delay between measurement attempts (milliseconds).
pub const BENCH_RETRY_DELAY_MS: u64 = 500;

/// Hard upper bound on waiting for an in-flight measurement on the same
/// device (milliseconds). The wait never exceeds this; on expiry the check
/// reports the best value obtained so far as a failing result.
pub const BENCH_WAIT_TIMEOUT_MS: u64 = 15_000;

/// Sentinel cached value meaning "not measured this session".
pub const UNMEASURED: i32 = -1;

// ============================================================================
// In-band sentinel values
// ============================================================================

/// Value reported for requests that cannot be routed to any probe.
pub const UNKNOWN_VALUE: &str = "unknown";

/// Value reported for devices whose configured path does not exist.
///
/// Distinct from any measured numeric value: hardware that is absent was
/// never tested, which is not the same as hardware that was tested and
/// failed.
pub const ABSENT_VALUE: &str = "absent";
