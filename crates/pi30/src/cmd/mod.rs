use std::future::Future;
use std::time::Duration;

use clap::{Args, Subcommand};
use pi30_client::{Client, ExchangeConfig, DEFAULT_MAX_ATTEMPTS};
use pi30_transport::{SerialConfig, SerialStream, DEFAULT_BAUD_RATE, DEFAULT_PORT};

use crate::exit::{client_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod frame;
pub mod monitor;
pub mod ports;
pub mod query;
pub mod raw;
pub mod set;
pub mod verify;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query the operating mode (QMOD).
    Mode,
    /// Query output and charger source priorities (QPIRI).
    Settings,
    /// Query general status telemetry (QPIGS).
    Status,
    /// Set output source priority (POPnn).
    SetOutput(SetArgs),
    /// Set charger source priority (PCPnn).
    SetCharge(SetArgs),
    /// Send an arbitrary command and print the validated reply.
    Raw(RawArgs),
    /// Poll status telemetry at an interval.
    Monitor(MonitorArgs),
    /// Print the wire frame for a command without opening a port.
    Frame(FrameArgs),
    /// Validate a captured reply frame given as hex.
    Verify(VerifyArgs),
    /// List serial ports.
    Ports,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Mode => query::mode(conn, format),
        Command::Settings => query::settings(conn, format),
        Command::Status => query::status(conn, format),
        Command::SetOutput(args) => set::output(args, conn, format),
        Command::SetCharge(args) => set::charge(args, conn, format),
        Command::Raw(args) => raw::run(args, conn, format),
        Command::Monitor(args) => monitor::run(args, conn, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Verify(args) => verify::run(args, format),
        Command::Ports => ports::run(format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial line and exchange settings shared by every device subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Serial device the inverter is attached to.
    #[arg(long, env = "PI30_PORT", default_value = DEFAULT_PORT, global = true)]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "PI30_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Reply timeout per attempt (e.g. 5s, 500ms).
    #[arg(long, env = "PI30_TIMEOUT", default_value = "5s", value_parser = parse_duration, global = true)]
    pub timeout: Duration,
    /// Settle delay after each write and between attempts.
    #[arg(long, env = "PI30_DELAY", default_value = "100ms", value_parser = parse_duration, global = true)]
    pub delay: Duration,
    /// Attempts per command before giving up.
    #[arg(long, env = "PI30_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub attempts: u32,
}

impl ConnectionArgs {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig::new(&self.port).with_baud_rate(self.baud)
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            timeout: self.timeout,
            base_delay: self.delay,
            max_attempts: self.attempts,
            ..ExchangeConfig::default()
        }
    }

    /// Open the port. Must run inside the runtime from [`block_on`].
    pub fn connect(&self) -> CliResult<Client<SerialStream>> {
        pi30_client::connect_with_config(&self.serial_config(), self.exchange_config())
            .map_err(|err| client_error("open failed", err))
    }
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Priority value, 0 to 4.
    pub value: u8,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    /// Command text, without checksum or terminator (e.g. QPIWS).
    pub command: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Time between samples (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub interval: Duration,
    /// Stop after N samples. Default: run until Ctrl-C.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Command text to encode.
    pub command: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Frame bytes as hex, terminator included (e.g. "28 42 E7 C9 0D").
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Drive `fut` to completion on a single-threaded runtime; the client only
/// ever has one exchange in flight.
pub fn block_on<F>(fut: F) -> CliResult<i32>
where
    F: Future<Output = CliResult<i32>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))?;
    runtime.block_on(fut)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn connection_args_build_configs() {
        let conn = ConnectionArgs {
            port: "/dev/ttyUSB0".into(),
            baud: 2400,
            timeout: Duration::from_secs(2),
            delay: Duration::from_millis(50),
            attempts: 1,
        };
        let serial = conn.serial_config();
        assert_eq!(serial.path, "/dev/ttyUSB0");
        assert_eq!(serial.baud_rate, 2400);

        let exchange = conn.exchange_config();
        assert_eq!(exchange.timeout, Duration::from_secs(2));
        assert_eq!(exchange.base_delay, Duration::from_millis(50));
        assert_eq!(exchange.max_attempts, 1);
        assert!(exchange.resync_on_error);
    }
}
