use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::checksum;
use crate::command::Command;
use crate::error::{FrameError, Result};

/// Carriage return: ends every frame in both directions.
pub const TERMINATOR: u8 = b'\r';

/// Checksum field width.
pub const CHECKSUM_LEN: usize = 2;

/// Smallest frame that can carry data: marker + at least one payload byte +
/// checksum + terminator. Anything of four bytes or fewer is a short packet.
pub const MIN_FRAME_LEN: usize = 5;

/// A reply payload whose checksum has been verified, marker byte removed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ValidatedReply {
    payload: Bytes,
}

impl ValidatedReply {
    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as text, one character per byte.
    pub fn to_text(&self) -> String {
        self.payload.iter().map(|&b| char::from(b)).collect()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

impl fmt::Display for ValidatedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for ValidatedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValidatedReply").field(&self.to_text()).finish()
    }
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬───────────────┬────────────┐
/// │ Command (N B)    │ CRC (2B BE)   │ CR (1B)    │
/// │ one byte / char  │ XMODEM, fixed │ 0x0D       │
/// └──────────────────┴───────────────┴────────────┘
/// ```
pub fn encode_frame(command: &Command, dst: &mut BytesMut) {
    let body = command.as_bytes();
    dst.reserve(body.len() + CHECKSUM_LEN + 1);
    dst.put_slice(body);
    dst.put_slice(&checksum(body));
    dst.put_u8(TERMINATOR);
}

/// Encode a command into a standalone buffer.
pub fn frame_bytes(command: &Command) -> Bytes {
    let mut buf = BytesMut::new();
    encode_frame(command, &mut buf);
    buf.freeze()
}

/// Validate one frame as read from the stream and extract its payload.
///
/// `raw` is everything up to and including the terminator. The last byte is
/// not inspected: the read boundary has already placed it.
pub fn decode_frame(raw: &[u8]) -> Result<ValidatedReply> {
    let len = raw.len();
    if len < MIN_FRAME_LEN {
        return Err(FrameError::ShortPacket { len });
    }

    let payload = &raw[..len - CHECKSUM_LEN - 1];
    let actual: [u8; CHECKSUM_LEN] = [raw[len - 3], raw[len - 2]];
    let expected = checksum(payload);
    if actual != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(ValidatedReply {
        payload: Bytes::copy_from_slice(&payload[1..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(payload: &[u8]) -> Vec<u8> {
        let mut out = payload.to_vec();
        out.extend_from_slice(&checksum(payload));
        out.push(TERMINATOR);
        out
    }

    #[test]
    fn encode_appends_checksum_and_terminator() {
        let frame = frame_bytes(&Command::new("QPIGS").unwrap());
        assert_eq!(frame.as_ref(), b"QPIGS\xB7\xA9\r");
    }

    #[test]
    fn encode_keeps_high_bytes_intact() {
        let frame = frame_bytes(&Command::new("Q\u{00FF}").unwrap());
        assert_eq!(&frame[..2], &[b'Q', 0xFF]);
        assert_eq!(frame.len(), 2 + CHECKSUM_LEN + 1);
    }

    #[test]
    fn encode_appends_to_existing_buffer() {
        let mut buf = BytesMut::from(&b"junk"[..]);
        encode_frame(&Command::new("QMOD").unwrap(), &mut buf);
        assert_eq!(buf.as_ref(), b"junkQMOD\x49\xC1\r");
    }

    #[test]
    fn decode_valid_reply_strips_marker() {
        let reply = decode_frame(&wire(b"(B")).unwrap();
        assert_eq!(reply.as_bytes(), b"B");
        assert_eq!(reply.to_text(), "B");
    }

    #[test]
    fn decode_device_ack() {
        let reply = decode_frame(b"(ACK\x39\x20\r").unwrap();
        assert_eq!(reply.to_text(), "ACK");
    }

    #[test]
    fn decode_short_packets() {
        let raws: [&[u8]; 5] = [b"", b"\r", b"(\r", b"(A\r", b"(AB\r"];
        for raw in raws {
            let err = decode_frame(raw).unwrap_err();
            assert!(
                matches!(err, FrameError::ShortPacket { len } if len == raw.len()),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn decode_marker_only_payload_is_empty_reply() {
        let raw = wire(b"(");
        assert_eq!(raw.len(), 4);
        assert!(matches!(decode_frame(&raw), Err(FrameError::ShortPacket { len: 4 })));

        let reply = decode_frame(&wire(b"(X")).unwrap();
        assert_eq!(reply.len(), 1);
    }

    #[test]
    fn decode_valid_for_any_payload() {
        let payloads: [&[u8]; 5] = [
            b"(P",
            b"(ACK",
            b"(230.0 50.0 229.9 50.0 0160 0112 003 408 26.70 000 100 0034 0000 000.0 00.00 00000 00010101",
            &[b'(', 0x00, 0xFF, 0x80, 0x7F],
            b"xyz",
        ];
        for payload in payloads {
            let reply = decode_frame(&wire(payload)).unwrap();
            assert_eq!(reply.as_bytes(), &payload[1..]);
        }
    }

    #[test]
    fn decode_checksum_mismatch() {
        let payload = b"(230.0 50.0";
        let good = checksum(payload);
        for bad in [[0u8, 0u8], [good[0] ^ 1, good[1]], [good[0], good[1] ^ 0x80]] {
            let mut raw = payload.to_vec();
            raw.extend_from_slice(&bad);
            raw.push(TERMINATOR);
            match decode_frame(&raw) {
                Err(FrameError::ChecksumMismatch { expected, actual }) => {
                    assert_eq!(expected, good);
                    assert_eq!(actual, bad);
                }
                other => panic!("expected checksum mismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_detects_corrupted_payload() {
        let mut raw = wire(b"(230.0 50.0");
        raw[2] = b'9';
        assert!(matches!(
            decode_frame(&raw),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn reply_debug_and_display() {
        let reply = decode_frame(&wire(b"(NAK")).unwrap();
        assert_eq!(reply.to_string(), "NAK");
        assert_eq!(format!("{reply:?}"), "ValidatedReply(\"NAK\")");
    }
}
