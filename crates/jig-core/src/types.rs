use crate::{
    Result,
    constants::{
        DEVICE_ID_RADIX, MAX_GROUP_ID, MAX_RAW_DEVICE_ID, STATUS_FAIL, STATUS_INIT, STATUS_PASS,
        STATUS_PENDING, UNKNOWN_VALUE, VALUE_WIDTH,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Peripheral group under test.
///
/// The numeric discriminants are the wire group ids used by the factory
/// host; they must stay stable across firmware revisions of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Group {
    System = 0,
    Storage = 1,
    Usb = 2,
    Hdmi = 3,
    Adc = 4,
    Ethernet = 5,
    Header = 6,
    Audio = 7,
    Led = 8,
    Pwm = 9,
    Ir = 10,
    Gpio = 11,
    Firmware = 12,
    Misc = 13,
}

impl Group {
    /// All groups in wire-id order.
    pub const ALL: [Group; 14] = [
        Group::System,
        Group::Storage,
        Group::Usb,
        Group::Hdmi,
        Group::Adc,
        Group::Ethernet,
        Group::Header,
        Group::Audio,
        Group::Led,
        Group::Pwm,
        Group::Ir,
        Group::Gpio,
        Group::Firmware,
        Group::Misc,
    ];

    /// Resolve a wire group id.
    ///
    /// # Errors
    /// Returns `Error::UnknownGroup` for ids outside the defined set. The
    /// dispatch table turns that into the in-band "unknown" fragment rather
    /// than propagating it to the peer.
    pub fn from_u8(id: u8) -> Result<Self> {
        Group::ALL
            .into_iter()
            .find(|g| g.as_u8() == id)
            .ok_or(Error::UnknownGroup { id })
    }

    /// Wire group id.
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Format the group id as a zero-padded 2-digit string.
    #[must_use]
    pub fn to_string_padded(self) -> String {
        format!("{:02}", self.as_u8())
    }

    /// Short lowercase token used in configuration and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Group::System => "system",
            Group::Storage => "storage",
            Group::Usb => "usb",
            Group::Hdmi => "hdmi",
            Group::Adc => "adc",
            Group::Ethernet => "ethernet",
            Group::Header => "header",
            Group::Audio => "audio",
            Group::Led => "led",
            Group::Pwm => "pwm",
            Group::Ir => "ir",
            Group::Gpio => "gpio",
            Group::Firmware => "firmware",
            Group::Misc => "misc",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Wire group id (2 digits, zero-padded).
///
/// Any two-digit id is valid on the wire; whether it routes to a probe is
/// the dispatch table's decision, so an unknown id still produces a
/// well-formed in-band response instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(u8);

impl GroupId {
    /// Create a group id with range validation.
    ///
    /// # Errors
    /// Returns `Error::UnknownGroup` if the id does not fit the 2-digit
    /// wire field.
    pub fn new(id: u8) -> Result<Self> {
        if id > MAX_GROUP_ID {
            return Err(Error::UnknownGroup { id });
        }
        Ok(GroupId(id))
    }

    /// Get the raw id as u8.
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Format the group id as a zero-padded 2-digit string.
    #[must_use]
    pub fn to_string_padded(self) -> String {
        format!("{:02}", self.0)
    }
}

impl From<Group> for GroupId {
    fn from(group: Group) -> Self {
        GroupId(group.as_u8())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u8 = s.parse().map_err(|_| Error::InvalidFieldValue {
            message: format!("Invalid group id: {s}"),
        })?;
        GroupId::new(id)
    }
}

/// Raw device id as supplied by the caller (4 wire digits).
///
/// A raw id encodes both which physical unit and which action via fixed
/// base-10 arithmetic; see [`RawDeviceId::decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawDeviceId(u16);

impl RawDeviceId {
    /// Create a raw device id with range validation.
    ///
    /// # Errors
    /// Returns `Error::DeviceIdRange` if the id does not fit the 4-digit
    /// wire field.
    pub fn new(id: u16) -> Result<Self> {
        if id > MAX_RAW_DEVICE_ID {
            return Err(Error::DeviceIdRange { id: id as u32 });
        }
        Ok(RawDeviceId(id))
    }

    /// Get the raw id as u16.
    #[inline]
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Split the raw id into (base device index, action).
    ///
    /// `base = raw % 10` selects the physical unit within a group;
    /// `action = raw / 10` selects the operation. The mapping is total and
    /// pure; out-of-range bases for a particular group are detected by the
    /// probe, not here.
    #[must_use]
    pub fn decompose(self) -> ProbeAddress {
        ProbeAddress {
            base: (self.0 % DEVICE_ID_RADIX) as u8,
            action: Action(self.0 / DEVICE_ID_RADIX),
        }
    }

    /// Format the raw id as a zero-padded 4-digit string.
    #[must_use]
    pub fn to_string_padded(self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for RawDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl std::str::FromStr for RawDeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u16 = s.parse().map_err(|_| Error::InvalidFieldValue {
            message: format!("Invalid raw device id: {s}"),
        })?;
        RawDeviceId::new(id)
    }
}

/// Operation selector, the quotient half of a raw device id.
///
/// The numeric value is interpreted per group: 0 = read/clear/pattern-0,
/// 1 = write/set/pattern-1, 2 = link-speed/pattern-2, 3 = pattern-3, and
/// so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(pub u16);

impl Action {
    /// Read / clear / pattern 0.
    pub const READ: Action = Action(0);
    /// Write / set / pattern 1.
    pub const WRITE: Action = Action(1);
    /// Link speed / pattern 2.
    pub const LINK: Action = Action(2);

    /// Numeric selector value.
    #[inline]
    #[must_use]
    pub fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decomposed device address: base unit index plus action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeAddress {
    /// Physical unit within the group. Must be `< 10`.
    pub base: u8,
    /// Requested operation.
    pub action: Action,
}

impl ProbeAddress {
    /// Recombine into a raw device id: `base + action * 10`.
    ///
    /// Inverse of [`RawDeviceId::decompose`] for `base < 10`; used when
    /// constructing synthetic test requests.
    #[must_use]
    pub fn compose(self) -> RawDeviceId {
        debug_assert!(u16::from(self.base) < DEVICE_ID_RADIX);
        RawDeviceId(u16::from(self.base) + self.action.0 * DEVICE_ID_RADIX)
    }
}

/// Wire command byte.
///
/// Only `C` (check) is live today; the newtype keeps the field open for
/// future command bytes without a protocol break while still rejecting
/// delimiter and non-printable characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command(char);

impl Command {
    /// Run a device check and return its result.
    pub const CHECK: Command = Command('C');

    /// Validate a command byte from the wire.
    ///
    /// # Errors
    /// Returns `Error::UnknownCommand` for non-graphic ASCII or frame
    /// delimiter characters.
    pub fn from_char(c: char) -> Result<Self> {
        if !c.is_ascii_graphic() || matches!(c, ',' | '@' | '#') {
            return Err(Error::UnknownCommand { code: c });
        }
        Ok(Command(c))
    }

    /// Wire representation.
    #[inline]
    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a single probe check.
///
/// Never boolean-only: `Pending` exists for act-type checks that only
/// command a physical change and for verification passes invoked before
/// the hardware event has occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Pass,
    Fail,
    Pending,
    Init,
}

impl ProbeStatus {
    /// Wire status character.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            ProbeStatus::Pass => STATUS_PASS,
            ProbeStatus::Fail => STATUS_FAIL,
            ProbeStatus::Pending => STATUS_PENDING,
            ProbeStatus::Init => STATUS_INIT,
        }
    }

    /// Resolve a wire status character.
    ///
    /// # Errors
    /// Returns `Error::InvalidFieldValue` for unrecognized characters.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            STATUS_PASS => Ok(ProbeStatus::Pass),
            STATUS_FAIL => Ok(ProbeStatus::Fail),
            STATUS_PENDING => Ok(ProbeStatus::Pending),
            STATUS_INIT => Ok(ProbeStatus::Init),
            _ => Err(Error::InvalidFieldValue {
                message: format!("Invalid status character: {c:?}"),
            }),
        }
    }

    /// Returns `true` for `Pass`.
    #[inline]
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, ProbeStatus::Pass)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Measured value carried by a probe reply.
///
/// Rendered into the fixed 20-character value slot: integers right-aligned,
/// text left-justified, space-padded either way. Text is validated at
/// construction so the codec never has to expand or truncate the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyValue {
    Int(i32),
    Text(String),
}

impl ReplyValue {
    /// Create a text value with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidFieldValue` if the text exceeds the value
    /// slot width or contains frame delimiter characters.
    pub fn text(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() > VALUE_WIDTH {
            return Err(Error::InvalidFieldValue {
                message: format!("Value exceeds {VALUE_WIDTH} chars: {value:?}"),
            });
        }
        if value.contains([',', '@', '#']) {
            return Err(Error::InvalidFieldValue {
                message: format!("Value contains reserved delimiters: {value:?}"),
            });
        }
        Ok(ReplyValue::Text(value))
    }

    /// Render into the fixed-width value slot.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            ReplyValue::Int(v) => format!("{:>width$}", v, width = VALUE_WIDTH),
            ReplyValue::Text(t) => format!("{:<width$}", t, width = VALUE_WIDTH),
        }
    }
}

impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReplyValue::Int(v) => write!(f, "{v}"),
            ReplyValue::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Status/value pair returned by every probe check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReply {
    pub status: ProbeStatus,
    pub value: ReplyValue,
}

impl ProbeReply {
    pub fn new(status: ProbeStatus, value: ReplyValue) -> Self {
        ProbeReply { status, value }
    }

    /// Passing reply with an integer value.
    #[must_use]
    pub fn pass_int(value: i32) -> Self {
        ProbeReply::new(ProbeStatus::Pass, ReplyValue::Int(value))
    }

    /// Failing reply with an integer value.
    #[must_use]
    pub fn fail_int(value: i32) -> Self {
        ProbeReply::new(ProbeStatus::Fail, ReplyValue::Int(value))
    }

    /// Pending/commanded reply with an integer value.
    #[must_use]
    pub fn pending_int(value: i32) -> Self {
        ProbeReply::new(ProbeStatus::Pending, ReplyValue::Int(value))
    }

    /// Failing reply with a short text sentinel.
    ///
    /// # Panics
    /// Panics if the sentinel is not a valid value slot text; all call
    /// sites use compile-time constants that are.
    #[must_use]
    pub fn fail_text(value: &'static str) -> Self {
        ProbeReply::new(
            ProbeStatus::Fail,
            ReplyValue::text(value).expect("static sentinel fits value slot"),
        )
    }

    /// The fixed fragment reported for unroutable requests.
    #[must_use]
    pub fn unknown() -> Self {
        ProbeReply::fail_text(UNKNOWN_VALUE)
    }
}

/// Explicit tag for the two halves of a two-phase check.
///
/// The original numbering scheme inferred act-versus-confirm from which
/// group id was used; the tag makes the split explicit in every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Issue a physical action (drive a pattern, start a measurement).
    Command,
    /// Independently confirm the effect of a prior command.
    Verify,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Group::System)]
    #[case(1, Group::Storage)]
    #[case(6, Group::Header)]
    #[case(13, Group::Misc)]
    fn group_roundtrip(#[case] id: u8, #[case] expected: Group) {
        assert_eq!(Group::from_u8(id).unwrap(), expected);
        assert_eq!(expected.as_u8(), id);
    }

    #[rstest]
    #[case(14)]
    #[case(99)]
    fn group_unknown(#[case] id: u8) {
        assert!(Group::from_u8(id).is_err());
        // Still a legal wire id: routing decides, not parsing.
        assert!(GroupId::new(id).is_ok());
    }

    #[test]
    fn group_id_range_and_padding() {
        assert_eq!(GroupId::new(1).unwrap().to_string_padded(), "01");
        assert_eq!(GroupId::from(Group::Misc).as_u8(), 13);
        assert!(GroupId::new(99).is_ok());
        assert!(GroupId::new(100).is_err());
    }

    #[rstest]
    #[case(23, 3, 2)]
    #[case(0, 0, 0)]
    #[case(9, 9, 0)]
    #[case(10, 0, 1)]
    #[case(9999, 9, 999)]
    fn raw_id_decompose(#[case] raw: u16, #[case] base: u8, #[case] action: u16) {
        let addr = RawDeviceId::new(raw).unwrap().decompose();
        assert_eq!(addr.base, base);
        assert_eq!(addr.action.index(), action);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 2)]
    #[case(9, 999)]
    fn raw_id_compose_inverse(#[case] base: u8, #[case] action: u16) {
        let addr = ProbeAddress {
            base,
            action: Action(action),
        };
        assert_eq!(addr.compose().decompose(), addr);
    }

    #[test]
    fn raw_id_range() {
        assert!(RawDeviceId::new(9999).is_ok());
        assert!(RawDeviceId::new(10_000).is_err());
    }

    #[test]
    fn raw_id_padding() {
        assert_eq!(RawDeviceId::new(23).unwrap().to_string_padded(), "0023");
    }

    #[test]
    fn command_validation() {
        assert_eq!(Command::from_char('C').unwrap(), Command::CHECK);
        assert!(Command::from_char(',').is_err());
        assert!(Command::from_char('@').is_err());
        assert!(Command::from_char('\x02').is_err());
    }

    #[rstest]
    #[case('P', ProbeStatus::Pass)]
    #[case('F', ProbeStatus::Fail)]
    #[case('C', ProbeStatus::Pending)]
    #[case('I', ProbeStatus::Init)]
    fn status_roundtrip(#[case] c: char, #[case] status: ProbeStatus) {
        assert_eq!(ProbeStatus::from_char(c).unwrap(), status);
        assert_eq!(status.as_char(), c);
    }

    #[test]
    fn status_unknown_char() {
        assert!(ProbeStatus::from_char('X').is_err());
    }

    #[test]
    fn reply_value_int_render() {
        let rendered = ReplyValue::Int(60).render();
        assert_eq!(rendered.len(), VALUE_WIDTH);
        assert!(rendered.ends_with("60"));
    }

    #[test]
    fn reply_value_negative_int_render() {
        let rendered = ReplyValue::Int(-1).render();
        assert_eq!(rendered.len(), VALUE_WIDTH);
        assert!(rendered.ends_with("-1"));
    }

    #[test]
    fn reply_value_text_render() {
        let rendered = ReplyValue::text("unknown").unwrap().render();
        assert_eq!(rendered.len(), VALUE_WIDTH);
        assert!(rendered.starts_with("unknown"));
    }

    #[test]
    fn reply_value_text_limits() {
        assert!(ReplyValue::text("a".repeat(20)).is_ok());
        assert!(ReplyValue::text("a".repeat(21)).is_err());
        assert!(ReplyValue::text("bad,value").is_err());
        assert!(ReplyValue::text("").is_ok());
    }

    #[test]
    fn unknown_fragment_shape() {
        let reply = ProbeReply::unknown();
        assert_eq!(reply.status, ProbeStatus::Fail);
        assert_eq!(reply.value, ReplyValue::Text("unknown".to_string()));
    }
}
