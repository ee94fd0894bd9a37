use crate::fragment::ResultFragment;
use bytes::Bytes;
use jig_core::{
    Command, Error, GroupId, RawDeviceId, Result,
    constants::{END_MARKER, FRAME_LEN, START_MARKER},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete fixed-width wire frame.
///
/// # Wire Format
///
/// ```text
/// @,<cmd:1>,<gid:2>,<raw:4>,<status:1>,<value:20>,#
/// ```
///
/// The same layout is used for requests and responses; a request carries a
/// placeholder result fragment and the response echoes command, group and
/// raw id with the measured fragment filled in. The total length is the
/// compile-time constant [`FRAME_LEN`]; any deviation is a framing error
/// and the frame is rejected outright, never partially decoded.
///
/// The group id field is any two-digit number: whether it routes to a
/// probe is decided by the dispatch table, which answers unroutable ids
/// with an in-band "unknown" fragment rather than a parse failure.
///
/// # Example exchange
///
/// ```text
/// host  -> @,C,01,0000,C,                    ,#   (storage 0, action read)
/// board -> @,C,01,0000,P,                  62,#   (pass, 62 MB/s)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFrame {
    pub command: Command,
    pub group_id: GroupId,
    pub raw_id: RawDeviceId,
    pub fragment: ResultFragment,
}

impl WireFrame {
    pub fn new(
        command: Command,
        group_id: impl Into<GroupId>,
        raw_id: RawDeviceId,
        fragment: ResultFragment,
    ) -> Self {
        WireFrame {
            command,
            group_id: group_id.into(),
            raw_id,
            fragment,
        }
    }

    /// Build a request frame with the placeholder result slot.
    #[must_use]
    pub fn request(group_id: impl Into<GroupId>, raw_id: RawDeviceId) -> Self {
        WireFrame::new(
            Command::CHECK,
            group_id,
            raw_id,
            ResultFragment::request_placeholder(),
        )
    }

    /// Build the response to a request, echoing its addressing fields.
    #[must_use]
    pub fn response_to(request: &WireFrame, fragment: ResultFragment) -> Self {
        WireFrame::new(request.command, request.group_id, request.raw_id, fragment)
    }

    /// Render into exactly [`FRAME_LEN`] characters.
    #[must_use]
    pub fn render(&self) -> String {
        let rendered = format!(
            "{},{},{},{},{},{}",
            START_MARKER as char,
            self.command.as_char(),
            self.group_id.to_string_padded(),
            self.raw_id.to_string_padded(),
            self.fragment.render(),
            END_MARKER as char,
        );
        debug_assert_eq!(rendered.len(), FRAME_LEN);
        rendered
    }

    /// Render into an owned byte buffer for transmission.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.render().into_bytes())
    }

    /// Parse a complete wire frame.
    ///
    /// # Errors
    /// Returns `Error::FrameLength` when the input is not exactly
    /// [`FRAME_LEN`] bytes; `Error::InvalidFrameFormat` for misplaced
    /// markers or delimiters; field-level errors for malformed contents.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != FRAME_LEN {
            return Err(Error::FrameLength { len: s.len() });
        }
        let b = s.as_bytes();

        if b[0] != START_MARKER || b[FRAME_LEN - 1] != END_MARKER {
            return Err(Error::InvalidFrameFormat {
                message: format!("Missing frame markers: {s:?}"),
            });
        }
        // Delimiter positions are fixed by the field widths.
        for pos in [1usize, 3, 6, 11, 34] {
            if b[pos] != b',' {
                return Err(Error::InvalidFrameFormat {
                    message: format!("Missing delimiter at byte {pos}: {s:?}"),
                });
            }
        }

        let command = Command::from_char(b[2] as char)?;
        let group_id: GroupId = s[4..6].parse()?;
        let raw_id: RawDeviceId = s[7..11].parse()?;
        let fragment = ResultFragment::parse(&s[12..34])?;

        Ok(WireFrame {
            command,
            group_id,
            raw_id,
            fragment,
        })
    }
}

impl fmt::Display for WireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
