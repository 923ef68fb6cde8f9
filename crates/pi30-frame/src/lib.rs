//! PI30 inverter frame codec.
//!
//! Every frame on the wire is:
//! - the command (or reply payload) as single-byte characters
//! - a 2-byte CRC-16/XMODEM checksum, high byte first
//! - a carriage return (0x0D) terminator
//!
//! Replies start with a `(` marker byte that carries no data; decoding
//! strips it after the checksum has been verified.

pub mod checksum;
pub mod codec;
pub mod command;
pub mod error;
pub mod hex;
#[cfg(feature = "async")]
pub mod stream;

pub use checksum::checksum;
pub use codec::{
    decode_frame, encode_frame, frame_bytes, ValidatedReply, CHECKSUM_LEN, MIN_FRAME_LEN,
    TERMINATOR,
};
pub use command::Command;
pub use error::{CommandError, FrameError, Result};
pub use hex::Hex;
#[cfg(feature = "async")]
pub use stream::{Pi30Codec, DEFAULT_MAX_FRAME_LEN};
