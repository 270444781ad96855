use std::io;
use thiserror::Error;

/// Surfaced by Session I/O on short reads/writes or a dropped connection. Wraps `io::Error`
/// rather than re-deriving its variants, since the underlying `TcpStream` failure is almost
/// always what a caller needs to see.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed by peer")]
    Closed,
}
