use crate::{fragment::ResultFragment, frame::WireFrame};
use jig_core::{
    Error, Result,
    constants::{FRAGMENT_LEN, FRAME_LEN},
};

/// Output of [`decode_wire`]: either a complete frame or a bare fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Frame(WireFrame),
    Fragment(ResultFragment),
}

/// Decode a wire payload of either recognized width.
///
/// Exactly two widths are accepted: the full request/response frame
/// ([`FRAME_LEN`]) and the bare result fragment ([`FRAGMENT_LEN`]). Any
/// other length is a framing error and the input is rejected without a
/// partial decode attempt; the function never reads past the declared
/// width.
///
/// # Errors
/// Returns `Error::FrameLength` for unrecognized lengths and the
/// field-level errors of [`WireFrame::parse`] / [`ResultFragment::parse`]
/// for malformed contents.
///
/// # Example
/// ```
/// use jig_protocol::{Decoded, decode_wire};
///
/// let frame = format!("@,C,01,0023,P,{:>20},#", 60);
/// assert!(matches!(decode_wire(&frame), Ok(Decoded::Frame(_))));
///
/// let fragment = format!("P,{:>20}", 60);
/// assert!(matches!(decode_wire(&fragment), Ok(Decoded::Fragment(_))));
///
/// assert!(decode_wire("@,C,01").is_err());
/// ```
pub fn decode_wire(input: &str) -> Result<Decoded> {
    match input.len() {
        FRAME_LEN => Ok(Decoded::Frame(WireFrame::parse(input)?)),
        FRAGMENT_LEN => Ok(Decoded::Fragment(ResultFragment::parse(input)?)),
        len => Err(Error::FrameLength { len }),
    }
}
