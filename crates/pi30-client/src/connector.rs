use pi30_transport::{SerialConfig, SerialStream};

use crate::client::Client;
use crate::config::ExchangeConfig;
use crate::error::Result;

/// Open `path` at the default line settings and wrap it in a client.
pub fn connect(path: impl Into<String>) -> Result<Client<SerialStream>> {
    connect_with_config(&SerialConfig::new(path), ExchangeConfig::default())
}

/// Open a serial port with explicit line and exchange settings.
///
/// Must be called from within a tokio runtime.
pub fn connect_with_config(
    serial: &SerialConfig,
    exchange: ExchangeConfig,
) -> Result<Client<SerialStream>> {
    let stream = pi30_transport::open(serial)?;
    Ok(Client::with_config(stream, exchange))
}
