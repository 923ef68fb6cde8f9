//! PI30 frame checksum.

use crc::{Crc, CRC_16_XMODEM};

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the 2-byte checksum the inverter firmware expects.
///
/// CRC-16/XMODEM, high byte first. Any byte that would read as `(`, LF or CR
/// is bumped by one so the checksum can never be mistaken for a frame marker
/// or terminator.
pub fn checksum(data: &[u8]) -> [u8; 2] {
    let [hi, lo] = XMODEM.checksum(data).to_be_bytes();
    [adjust(hi), adjust(lo)]
}

const fn adjust(byte: u8) -> u8 {
    match byte {
        b'(' | b'\n' | b'\r' => byte + 1,
        _ => byte,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_device_traffic() {
        assert_eq!(checksum(b"QPIGS"), [0xB7, 0xA9]);
        assert_eq!(checksum(b"QMOD"), [0x49, 0xC1]);
        assert_eq!(checksum(b"QPIRI"), [0xF8, 0x54]);
        assert_eq!(checksum(b"(ACK"), [0x39, 0x20]);
        assert_eq!(checksum(b"(NAK"), [0x73, 0x73]);
    }

    #[test]
    fn standard_check_value() {
        assert_eq!(checksum(b"123456789"), [0x31, 0xC3]);
    }

    #[test]
    fn reserved_bytes_are_bumped() {
        // Raw CRC of POP02 is 0xE20A; the LF low byte goes out as 0x0B.
        assert_eq!(checksum(b"POP02"), [0xE2, 0x0B]);
        // Raw CRC 0xAA0D.
        assert_eq!(checksum(b"(\",")[1], 0x0E);
        // Raw CRC 0x2857.
        assert_eq!(checksum(b"(#'")[0], 0x29);
    }

    #[test]
    fn never_emits_terminator_or_marker() {
        for a in 0u8..=255 {
            for b in [0x00u8, 0x20, 0x30, 0x7F, 0xFF] {
                let sum = checksum(&[b'(', a, b]);
                for byte in sum {
                    assert!(!matches!(byte, b'(' | b'\n' | b'\r'), "{a:#04x} {b:#04x}");
                }
            }
        }
    }

    #[test]
    fn deterministic_and_discriminating() {
        let samples: [&[u8]; 6] = [b"QMOD", b"QPIRI", b"QPIGS", b"POP00", b"POP01", b"PCP02"];
        for s in samples {
            assert_eq!(checksum(s), checksum(s));
        }
        for (i, a) in samples.iter().enumerate() {
            for b in &samples[i + 1..] {
                assert_ne!(checksum(a), checksum(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(b""), [0x00, 0x00]);
    }
}
