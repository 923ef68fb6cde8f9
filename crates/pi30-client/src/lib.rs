//! PI30 inverter client.
//!
//! [`Client`] drives one command at a time over any async byte stream:
//! it writes the framed command, waits for a terminated reply, validates the
//! checksum and retries within an explicit budget. The typed wrappers
//! (`query_mode`, `query_settings`, `query_status` and the source setters)
//! decode the validated payload into [`Mode`], [`Settings`], [`Telemetry`] or
//! an acknowledgement.
//!
//! ```no_run
//! # async fn run() -> pi30_client::Result<()> {
//! let mut client = pi30_client::connect("/dev/ttyUSB0")?;
//! let status = client.query_status().await?;
//! println!("battery at {} V", status.battery_voltage);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod connector;
pub mod decode;
pub mod error;

pub use client::Client;
pub use command::{set_charge_source, set_output_source, QMOD, QPIGS, QPIRI, SOURCE_LIMIT};
pub use config::{ExchangeConfig, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
pub use connector::{connect, connect_with_config};
pub use decode::{Ack, DecodeError, Mode, Settings, Telemetry};
pub use error::{ClientError, Result};
