use std::fmt;
use std::io;

use pi30_client::ClientError;
use pi30_frame::FrameError;
use pi30_transport::{SerialErrorKind, TransportError};

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
/// The inverter answered `NAK`.
pub const REJECTED: i32 = 61;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(transport_code(&err), format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(frame_code(&err), format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    CliError::new(client_code(&err), format!("{context}: {err}"))
}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    }
}

fn transport_code(err: &TransportError) -> i32 {
    match err {
        TransportError::Io(source) => io_code(source),
        TransportError::Open { source, .. }
            if source.kind() == SerialErrorKind::Io(io::ErrorKind::PermissionDenied) =>
        {
            PERMISSION_DENIED
        }
        _ if err.is_invalid_settings() => USAGE,
        _ => TRANSPORT_ERROR,
    }
}

fn frame_code(err: &FrameError) -> i32 {
    match err {
        FrameError::Io(source) => io_code(source),
        _ => DATA_INVALID,
    }
}

/// Exhausted retries exit with the code of the last failure.
fn client_code(err: &ClientError) -> i32 {
    match err {
        ClientError::Transport(err) => transport_code(err),
        ClientError::Frame(err) => frame_code(err),
        ClientError::Timeout(_) => TIMEOUT,
        ClientError::Disconnected => FAILURE,
        ClientError::NoValidResponse { last, .. } => client_code(last),
        ClientError::Malformed(_) => DATA_INVALID,
        ClientError::Rejected { .. } => REJECTED,
        ClientError::InvalidCommand(_) | ClientError::InvalidArgument { .. } => USAGE,
    }
}
