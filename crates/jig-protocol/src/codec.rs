//! Tokio codec for wire frame transport.
//!
//! Integrates the fixed-width jig protocol with async I/O by implementing
//! [`Decoder`] and [`Encoder`] over [`WireFrame`], for use with
//! `tokio_util::codec::Framed`.
//!
//! Because every frame has the same compile-time length, the decoder is a
//! resynchronizing fixed-window scanner: it discards garbage up to the next
//! start marker, waits until a full window is buffered, and rejects windows
//! whose trailing marker is misplaced. There is no partial decode — a
//! malformed window is an error, not a recoverable prefix.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use jig_protocol::{JigCodec, WireFrame};
//! use jig_core::{Group, RawDeviceId};
//! use futures::{SinkExt, StreamExt};
//!
//! # async fn example() -> jig_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:5000").await?;
//! let mut framed = Framed::new(stream, JigCodec::new());
//!
//! let request = WireFrame::request(Group::Storage, RawDeviceId::new(0)?);
//! framed.send(request).await?;
//!
//! if let Some(Ok(response)) = framed.next().await {
//!     println!("{}", response);
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::WireFrame;
use jig_core::{
    Error, Result,
    constants::{FRAME_LEN, START_MARKER},
};

/// Codec for fixed-width jig frames.
#[derive(Debug, Default)]
pub struct JigCodec {
    _private: (),
}

impl JigCodec {
    pub fn new() -> Self {
        JigCodec::default()
    }
}

impl Decoder for JigCodec {
    type Item = WireFrame;
    type Error = Error;

    /// Extract the next complete frame from the byte stream.
    ///
    /// - `Ok(Some(frame))` — a complete frame was decoded
    /// - `Ok(None)` — need more data
    /// - `Err(_)` — a full window was present but malformed; the window is
    ///   consumed so the stream can resynchronize on the next marker
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        // Resynchronize: drop anything before the start marker.
        if let Some(start) = src.iter().position(|&b| b == START_MARKER) {
            if start > 0 {
                src.advance(start);
            }
        } else {
            src.clear();
            return Ok(None);
        }

        if src.len() < FRAME_LEN {
            return Ok(None);
        }

        let window = src.split_to(FRAME_LEN);
        let text = std::str::from_utf8(&window).map_err(|e| Error::InvalidFrameFormat {
            message: format!("Frame is not valid UTF-8: {e}"),
        })?;

        WireFrame::parse(text).map(Some)
    }
}

impl Encoder<WireFrame> for JigCodec {
    type Error = Error;

    fn encode(&mut self, item: WireFrame, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}
