/// Errors that can occur while decoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame is too small to hold a marker, a checksum and a terminator.
    #[error("short packet ({len} bytes)")]
    ShortPacket { len: usize },

    /// The received checksum does not match the one computed over the payload.
    #[error(
        "checksum mismatch (expected {:02X}{:02X}, got {:02X}{:02X})",
        .expected[0], .expected[1], .actual[0], .actual[1]
    )]
    ChecksumMismatch { expected: [u8; 2], actual: [u8; 2] },

    /// More bytes than the configured maximum arrived without a terminator.
    #[error("frame exceeds {max} bytes without a terminator")]
    FrameTooLong { max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a string cannot be sent as a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("command is empty")]
    Empty,

    /// The frame terminator would end the frame early on the wire.
    #[error("command contains the frame terminator at offset {0}")]
    ContainsTerminator(usize),

    /// The wire encoding is one byte per character.
    #[error("command character {0:?} does not fit in a single byte")]
    NotSingleByte(char),
}

pub type Result<T> = std::result::Result<T, FrameError>;
