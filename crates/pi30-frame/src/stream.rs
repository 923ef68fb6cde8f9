//! tokio-util codec that cuts a byte stream into PI30 frames.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::codec::{decode_frame, encode_frame, ValidatedReply, TERMINATOR};
use crate::command::Command;
use crate::error::FrameError;
use crate::hex::Hex;

/// Default cap on a single inbound frame. The longest PI30 reply (QPIRI) is
/// about 110 bytes.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Splits inbound bytes at each terminator and validates the frame; encodes
/// outbound commands.
///
/// Protocol failures (short packet, checksum mismatch, oversized frame) are
/// yielded as items rather than codec errors, so a single corrupt frame does
/// not end the stream. Only transport I/O errors surface as `Err`.
#[derive(Debug, Clone)]
pub struct Pi30Codec {
    max_frame_len: usize,
    /// Where to resume scanning for a terminator on the next call.
    next_index: usize,
    /// Skipping the tail of an oversized frame.
    discarding: bool,
}

impl Pi30Codec {
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            next_index: 0,
            discarding: false,
        }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Forget any partially scanned frame. Pair with clearing the read buffer.
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.discarding = false;
    }
}

impl Default for Pi30Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Pi30Codec {
    type Item = Result<ValidatedReply, FrameError>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let terminator = src[self.next_index..]
                .iter()
                .position(|&b| b == TERMINATOR)
                .map(|offset| self.next_index + offset);

            if self.discarding {
                match terminator {
                    Some(end) => {
                        src.advance(end + 1);
                        self.reset();
                        continue;
                    }
                    None => {
                        src.clear();
                        self.next_index = 0;
                        return Ok(None);
                    }
                }
            }

            return match terminator {
                Some(end) if end < self.max_frame_len => {
                    let raw = src.split_to(end + 1);
                    self.next_index = 0;
                    trace!(bytes = raw.len(), frame = %Hex(&raw), "frame received");
                    Ok(Some(decode_frame(&raw)))
                }
                None if src.len() < self.max_frame_len => {
                    self.next_index = src.len();
                    Ok(None)
                }
                _ => {
                    debug!(max = self.max_frame_len, "oversized frame, discarding");
                    self.discarding = true;
                    self.next_index = 0;
                    Ok(Some(Err(FrameError::FrameTooLong {
                        max: self.max_frame_len,
                    })))
                }
            };
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        if !src.is_empty() {
            debug!(bytes = src.len(), "stream closed mid-frame");
            src.clear();
        }
        self.reset();
        Ok(None)
    }
}

impl<'a> Encoder<&'a Command> for Pi30Codec {
    type Error = std::io::Error;

    fn encode(&mut self, item: &'a Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(item, dst);
        Ok(())
    }
}
