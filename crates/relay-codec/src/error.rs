use thiserror::Error;

/// Faults raised by the [`crate::buffer::Codec`]. Both variants carry enough context for the
/// dispatch boundary to log a useful diagnostic and abandon the offending packet; neither
/// variant advances any cursor before returning.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// A read, write or `put` would cross the buffer's current size.
    #[error("position fault in {operation}: position={position} size={current_size} value_size={value_size}")]
    Position {
        operation: &'static str,
        position: usize,
        current_size: usize,
        value_size: usize,
    },
    /// A copy was attempted from a zero-length source.
    #[error("source fault in {operation}: size={current_size} value_size={value_size}")]
    Source {
        operation: &'static str,
        current_size: usize,
        value_size: usize,
    },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// BigInt faults. Division by zero is the only recoverable-in-principle case; it is treated as
/// fatal and `BigNumber`'s `Div`/`Rem` operators panic on it, mirroring the panic a primitive
/// integer division by zero would raise.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BigIntError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("could not parse big integer from the supplied string")]
    ParseError,
}
