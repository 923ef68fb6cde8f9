//! Serial byte stream transport for PI30 inverters.
//!
//! Opens the serial device an inverter is attached to and hands back a
//! duplex byte stream. Everything above this layer (framing, exchanges,
//! decoding) only needs the [`ByteStream`] bound, so tests can substitute an
//! in-memory pipe for real hardware.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{list_ports, open, PortInfo, SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT};
pub use traits::ByteStream;

pub use tokio_serial::{Error as SerialError, ErrorKind as SerialErrorKind, SerialStream};
