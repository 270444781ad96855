//! Client-side engine for the world session protocol: framing, the sender/receiver pipeline, the
//! periodic event scheduler, and the orchestrator tying them together. Opcode handler bodies,
//! the realm handshake, on-disk caches beyond the default JSON one, and any console front end
//! are the embedder's job — see the collaborator traits in [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod console;
pub mod error;
pub mod frame;
pub mod logging;
pub mod opcode;
pub mod packet;
pub mod session;

pub use collaborators::{BlobCache, HandlerTable, JsonBlobCache, OpcodeDispatcher, SessionKeyProvider};
pub use config::SessionConfig;
pub use console::handle_console_command;
pub use error::TransportError;
pub use packet::WorldPacket;
pub use session::{Connection, Event, EventId, EventMgr, Session};
