use std::time::Duration;

use pi30_frame::{CommandError, FrameError};

use crate::decode::DecodeError;

/// Errors that can occur during an exchange with the inverter.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Opening or configuring the serial port failed.
    #[error("transport error: {0}")]
    Transport(#[from] pi30_transport::TransportError),

    /// A reply frame was rejected (short packet, checksum mismatch, oversized)
    /// or the stream failed while reading or writing.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// No terminated reply arrived in time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The stream reached end-of-file before a reply terminator.
    #[error("stream closed before a reply arrived")]
    Disconnected,

    /// Every attempt allowed by the retry budget failed.
    #[error("no valid response to {command} after {attempts} attempt(s): {last}")]
    NoValidResponse {
        command: String,
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },

    /// The frame was valid but its content has the wrong shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] DecodeError),

    /// The inverter answered `NAK`.
    #[error("inverter rejected {command}")]
    Rejected { command: String },

    /// The command cannot be framed.
    #[error("invalid command: {0}")]
    InvalidCommand(#[from] CommandError),

    /// A setter argument is outside what the inverter accepts.
    #[error("{name} must be below {limit}, got {value}")]
    InvalidArgument {
        name: &'static str,
        value: u8,
        limit: u8,
    },
}

impl ClientError {
    /// Whether another attempt at the same exchange could succeed.
    ///
    /// End-of-file is permanent; everything that happens on a live stream is
    /// worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Frame(_) | ClientError::Timeout(_))
    }

    /// Whether the stream may hold bytes from a reply that was not consumed.
    pub(crate) fn leaves_stale_input(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_)
                | ClientError::Frame(
                    FrameError::ShortPacket { .. }
                        | FrameError::ChecksumMismatch { .. }
                        | FrameError::FrameTooLong { .. }
                )
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
