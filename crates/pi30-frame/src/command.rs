use std::fmt;

use bytes::Bytes;

use crate::codec::TERMINATOR;
use crate::error::CommandError;

/// A command string ready to be framed.
///
/// Holds the command's wire bytes: one byte per character, no checksum and
/// no terminator. Construction rejects anything that could not be framed
/// unambiguously.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Command {
    bytes: Bytes,
}

impl Command {
    /// Validate `text` and build a command from it.
    pub fn new(text: &str) -> Result<Self, CommandError> {
        if text.is_empty() {
            return Err(CommandError::Empty);
        }

        let mut bytes = Vec::with_capacity(text.len());
        for (offset, ch) in text.chars().enumerate() {
            let byte = u8::try_from(u32::from(ch)).map_err(|_| CommandError::NotSingleByte(ch))?;
            if byte == TERMINATOR {
                return Err(CommandError::ContainsTerminator(offset));
            }
            bytes.push(byte);
        }

        Ok(Self {
            bytes: Bytes::from(bytes),
        })
    }

    /// Build a command from a compile-time constant.
    ///
    /// # Panics
    ///
    /// If `text` is empty, contains a carriage return or is not ASCII. In a
    /// `const` item this is a compile error.
    pub const fn from_static(text: &'static str) -> Self {
        let bytes = text.as_bytes();
        assert!(!bytes.is_empty(), "command is empty");
        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i].is_ascii(), "static command must be ASCII");
            assert!(bytes[i] != TERMINATOR, "command contains the frame terminator");
            i += 1;
        }
        Self {
            bytes: Bytes::from_static(bytes),
        }
    }

    /// The command's wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes the command occupies on the wire, before framing.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.bytes.iter() {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({self})")
    }
}

impl std::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
