//! Low-level substrate for the world session protocol: arbitrary-precision integers for the
//! handshake, the mixed byte/bit/packed-field codec buffer, and the packet stream cipher. No
//! networking and no threads live here — see `relay-client` for those.

pub mod bigint;
pub mod buffer;
pub mod crypto;
pub mod error;
pub mod time;

pub use bigint::{BigNumber, Endian};
pub use buffer::{Codec, PackedDateTime, Scalar};
pub use crypto::{PacketCrypt, ReceiveCrypt, SendCrypt};
pub use error::{BigIntError, CodecError, CodecResult};
