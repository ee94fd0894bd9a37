use jig_core::{
    Error, ProbeReply, ProbeStatus, ReplyValue, Result,
    constants::{FRAGMENT_LEN, VALUE_WIDTH},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width per-device result fragment.
///
/// Rendered as `<status:1>,<value:20>` — exactly [`FRAGMENT_LEN`] bytes.
/// Integer values occupy the slot right-aligned, text values left-justified;
/// the fragment never grows or shrinks regardless of the natural width of
/// the value, so callers must pre-validate that values fit (which
/// [`ReplyValue`] construction enforces).
///
/// The fragment is embedded in the full wire frame and is also recognized on
/// its own by [`decode_wire`](crate::decode_wire) for device-local replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFragment {
    pub status: ProbeStatus,
    pub value: ReplyValue,
}

impl ResultFragment {
    pub fn new(status: ProbeStatus, value: ReplyValue) -> Self {
        ResultFragment { status, value }
    }

    /// The fixed fragment reported for unroutable requests.
    #[must_use]
    pub fn unknown() -> Self {
        ProbeReply::unknown().into()
    }

    /// An empty request-side fragment (pending status, blank value).
    ///
    /// Request frames carry the result slot too; the requester fills it
    /// with this placeholder.
    #[must_use]
    pub fn request_placeholder() -> Self {
        ResultFragment {
            status: ProbeStatus::Pending,
            value: ReplyValue::Text(String::new()),
        }
    }

    /// Render into exactly [`FRAGMENT_LEN`] characters.
    #[must_use]
    pub fn render(&self) -> String {
        let rendered = format!("{},{}", self.status.as_char(), self.value.render());
        debug_assert_eq!(rendered.len(), FRAGMENT_LEN);
        rendered
    }

    /// Parse a bare result fragment.
    ///
    /// Length mismatch is fatal (framing error). After the mandatory status
    /// prefix, an all-blank value slot is treated as absent data rather
    /// than an error.
    ///
    /// # Errors
    /// Returns `Error::FrameLength` when the input is not exactly
    /// [`FRAGMENT_LEN`] bytes, and `Error::InvalidFrameFormat` /
    /// `Error::InvalidFieldValue` for malformed field contents.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != FRAGMENT_LEN {
            return Err(Error::FrameLength { len: s.len() });
        }

        let mut chars = s.chars();
        let status_char = chars.next().ok_or(Error::FrameLength { len: 0 })?;
        let status = ProbeStatus::from_char(status_char)?;

        if chars.next() != Some(',') {
            return Err(Error::InvalidFrameFormat {
                message: format!("Missing value delimiter in fragment: {s:?}"),
            });
        }

        let slot = &s[2..];
        let value = parse_value_slot(slot)?;

        Ok(ResultFragment { status, value })
    }
}

/// Interpret the 20-character value slot.
///
/// A slot that trims to an integer is an integer value; anything else is
/// text; an all-blank slot is absent data (empty text).
fn parse_value_slot(slot: &str) -> Result<ReplyValue> {
    debug_assert_eq!(slot.len(), VALUE_WIDTH);
    let trimmed = slot.trim();
    if trimmed.is_empty() {
        return ReplyValue::text("");
    }
    if let Ok(v) = trimmed.parse::<i32>() {
        return Ok(ReplyValue::Int(v));
    }
    ReplyValue::text(trimmed)
}

impl From<ProbeReply> for ResultFragment {
    fn from(reply: ProbeReply) -> Self {
        ResultFragment {
            status: reply.status,
            value: reply.value,
        }
    }
}

impl fmt::Display for ResultFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
