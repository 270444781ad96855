//! Ties the connection, the scheduler and the collaborator traits together. Grounded on
//! `original_source/src/World/WorldSession.cpp`'s `Enter()`: four periodic events are
//! registered — draining inbound packets, a disabled-by-default keep-alive, a disabled-by-default
//! ping, and an always-on periodic save — before the scheduler is started.

use crate::collaborators::{BlobCache, OpcodeDispatcher, SessionKeyProvider};
use crate::config::{
    SessionConfig, DEFAULT_INCOMING_DRAIN_PERIOD, DEFAULT_KEEP_ALIVE_PERIOD, DEFAULT_PERIODIC_SAVE_PERIOD,
    DEFAULT_PING_PERIOD,
};
use crate::opcode::{CMSG_KEEP_ALIVE, CMSG_PING};
use crate::packet::WorldPacket;
use crate::session::event::{Event, EventId, EventMgr};
use crate::session::io::Connection;
use relay_codec::Endian;
use slog::Logger;
use std::io;
use std::sync::{Arc, Mutex};

pub struct Session {
    connection: Arc<Connection>,
    dispatcher: Arc<dyn OpcodeDispatcher>,
    blob_cache: Arc<Mutex<dyn BlobCache + Send>>,
    event_mgr: EventMgr,
    log: Logger,
}

impl Session {
    /// Connects to the realm named by `key_provider` and arms the sender/receiver threads with
    /// its session key. Does not start the scheduler — call [`Session::enter`] for that, the way
    /// the reference splits construction from `Enter()`.
    pub fn connect(
        key_provider: &dyn SessionKeyProvider,
        dispatcher: Arc<dyn OpcodeDispatcher>,
        blob_cache: Arc<Mutex<dyn BlobCache + Send>>,
        log: Logger,
    ) -> io::Result<Self> {
        let key_bytes = key_provider.key().to_bytes(0, Endian::Big);
        let connection = Connection::connect(key_provider.realm_address(), key_bytes, log.clone())?;
        Ok(Session {
            connection: Arc::new(connection),
            dispatcher,
            blob_cache,
            event_mgr: EventMgr::new(),
            log,
        })
    }

    /// Registers the four periodic events and starts the scheduler. Idempotent with respect to
    /// the scheduler's running state: it always stops first, matching the reference's
    /// `eventMgr_.Stop()` at the top of `Enter()`.
    pub fn enter(&mut self, config: &SessionConfig) {
        self.event_mgr.stop();

        if let Err(e) = self.blob_cache.lock().unwrap().load() {
            slog::warn!(self.log, "blob cache load failed, starting empty"; "error" => %e);
        }

        let connection = Arc::clone(&self.connection);
        let dispatcher = Arc::clone(&self.dispatcher);
        let dispatch_log = self.log.clone();
        self.event_mgr.add_event(Event::new(
            EventId::ProcessIncoming,
            DEFAULT_INCOMING_DRAIN_PERIOD,
            true,
            Box::new(move || {
                while let Some(mut packet) = connection.try_next_packet() {
                    let opcode = packet.opcode() as u16;
                    if let Err(e) = dispatcher.dispatch(opcode, &mut packet) {
                        slog::warn!(dispatch_log, "dispatch failed, dropping packet"; "opcode" => opcode, "error" => %e);
                    }
                }
            }),
        ));

        let keep_alive_connection = Arc::clone(&self.connection);
        self.event_mgr.add_event(Event::new(
            EventId::SendKeepAlive,
            DEFAULT_KEEP_ALIVE_PERIOD,
            config.keep_alive_enabled,
            Box::new(move || {
                keep_alive_connection.enqueue_packet(WorldPacket::new(CMSG_KEEP_ALIVE));
            }),
        ));

        let ping_connection = Arc::clone(&self.connection);
        self.event_mgr.add_event(Event::new(
            EventId::SendPing,
            DEFAULT_PING_PERIOD,
            config.ping_enabled,
            Box::new(move || {
                ping_connection.enqueue_packet(WorldPacket::new(CMSG_PING));
            }),
        ));

        let save_cache = Arc::clone(&self.blob_cache);
        let save_log = self.log.clone();
        self.event_mgr.add_event(Event::new(
            EventId::PeriodicSave,
            DEFAULT_PERIODIC_SAVE_PERIOD,
            true,
            Box::new(move || {
                if let Err(e) = save_cache.lock().unwrap().save() {
                    slog::warn!(save_log, "blob cache save failed"; "error" => %e);
                }
            }),
        ));

        self.event_mgr.start();
    }

    pub fn send_packet(&self, packet: WorldPacket) {
        self.connection.enqueue_packet(packet);
    }

    pub fn disconnect(&mut self) {
        self.event_mgr.stop();
        self.connection.disconnect();
    }
}
