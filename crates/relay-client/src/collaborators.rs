//! The seams an embedder plugs into: where the session key and realm address come from, how an
//! incoming opcode gets routed to handler code, and where a small piece of durable state (the
//! reference's player-name cache) is persisted. CORE ships one default implementation of the
//! last trait so the crate is runnable end-to-end without an embedder supplying anything.

use crate::packet::WorldPacket;
use relay_codec::{BigNumber, CodecError};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Supplies the session key negotiated during the handshake and the realm address to connect
/// to. The handshake itself is out of scope; CORE only needs the result.
pub trait SessionKeyProvider {
    fn key(&self) -> &BigNumber;
    fn realm_address(&self) -> &str;
}

/// Routes a decoded opcode to handler code. Handler bodies are entirely the embedder's concern —
/// CORE only guarantees that `dispatch` is called once per successfully framed packet, with the
/// packet's read cursor at the start of its body.
pub trait OpcodeDispatcher: Send + Sync {
    fn dispatch(&self, opcode: u16, packet: &mut WorldPacket) -> Result<(), CodecError>;
}

type Handler = Box<dyn FnMut(&mut WorldPacket) -> Result<(), CodecError> + Send>;

/// A `HashMap`-backed `OpcodeDispatcher` building block, for embedders who would rather register
/// per-opcode closures than hand-write the trait.
#[derive(Default)]
pub struct HandlerTable {
    handlers: std::sync::Mutex<HashMap<u16, Handler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        HandlerTable {
            handlers: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn register<F>(&mut self, opcode: u16, handler: F)
    where
        F: FnMut(&mut WorldPacket) -> Result<(), CodecError> + Send + 'static,
    {
        self.handlers.lock().unwrap().insert(opcode, Box::new(handler));
    }
}

impl OpcodeDispatcher for HandlerTable {
    fn dispatch(&self, opcode: u16, packet: &mut WorldPacket) -> Result<(), CodecError> {
        let mut handlers = self.handlers.lock().unwrap();
        match handlers.get_mut(&opcode) {
            Some(handler) => handler(packet),
            None => Ok(()),
        }
    }
}

/// Persists a small piece of state across sessions — the reference's `playerNames_` cache.
/// `load` is called once when the session is entered; `save` is called from the periodic-save
/// event.
pub trait BlobCache {
    fn load(&mut self) -> io::Result<()>;
    fn save(&self) -> io::Result<()>;
}

/// A minimal JSON-file-backed default so the crate is runnable without an embedder supplying its
/// own cache.
pub struct JsonBlobCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonBlobCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonBlobCache {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }
}

impl BlobCache for JsonBlobCache {
    fn load(&mut self) -> io::Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                self.entries = serde_json::from_str(&contents)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn save(&self) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, contents)
    }
}
