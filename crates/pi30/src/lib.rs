//! PI30 solar inverter protocol client.
//!
//! Talks to PI30-family hybrid inverters over their 2400 baud serial port:
//! CRC-16 framed ASCII commands out, checksummed replies back, decoded into
//! typed records.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port opening and enumeration
//! - [`frame`]: checksum, frame encoding/validation, stream codec
//! - [`client`]: exchange engine with retry and resync, response decoders
//!   (behind the default `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use pi30_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pi30_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use pi30_client::*;
}
