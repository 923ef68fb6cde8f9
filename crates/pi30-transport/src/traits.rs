use tokio::io::{AsyncRead, AsyncWrite};

/// A duplex byte channel to one device.
///
/// The open/close lifecycle belongs to whoever constructs the stream; the
/// protocol layers only read and write. Implemented for every
/// `AsyncRead + AsyncWrite + Unpin + Send` type, which covers
/// [`tokio_serial::SerialStream`] and `tokio::io::DuplexStream`.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}
