/// Errors that can occur while opening or configuring the serial transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: tokio_serial::Error,
    },

    /// Failed to enumerate serial ports.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(tokio_serial::Error),

    /// Failed to apply a setting to an already open port.
    #[error("failed to configure serial port: {0}")]
    Configure(tokio_serial::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether the port exists but rejected the requested line settings
    /// (for example an unsupported baud rate), as opposed to a missing or
    /// inaccessible device.
    pub fn is_invalid_settings(&self) -> bool {
        match self {
            TransportError::Open { source, .. } | TransportError::Configure(source) => {
                source.kind() == tokio_serial::ErrorKind::InvalidInput
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use tokio_serial::ErrorKind;

    use super::*;

    fn open_error(kind: ErrorKind) -> TransportError {
        TransportError::Open {
            path: "/dev/ttyUSB0".into(),
            source: tokio_serial::Error::new(kind, "test"),
        }
    }

    #[test]
    fn invalid_input_is_a_settings_problem() {
        assert!(open_error(ErrorKind::InvalidInput).is_invalid_settings());
        assert!(TransportError::Configure(tokio_serial::Error::new(
            ErrorKind::InvalidInput,
            "baud"
        ))
        .is_invalid_settings());
    }

    #[test]
    fn missing_device_is_not_a_settings_problem() {
        assert!(!open_error(ErrorKind::NoDevice).is_invalid_settings());
        assert!(!open_error(ErrorKind::Io(std::io::ErrorKind::NotFound)).is_invalid_settings());
        assert!(!TransportError::Io(std::io::ErrorKind::BrokenPipe.into()).is_invalid_settings());
    }

    #[test]
    fn open_error_names_the_path() {
        let err = open_error(ErrorKind::NoDevice);
        assert!(err.to_string().starts_with("failed to open /dev/ttyUSB0"));
    }
}
