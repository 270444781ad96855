//! The sender and receiver threads and their mutex-guarded FIFO queues. Grounded on
//! `original_source/src/World/WorldSocket.cpp`'s `RunSenderThread`/`RunReceiverThread`: a
//! dedicated thread per direction, blocking socket calls, and the packet cipher armed only once
//! the auth-session packet has gone out. The cipher covers the header only (size + opcode) —
//! bodies cross the wire in the clear, matching the reference client's own framing.

use crate::error::TransportError;
use crate::frame;
use crate::opcode::CMSG_AUTH_SESSION;
use crate::packet::WorldPacket;
use relay_codec::{Codec, ReceiveCrypt, SendCrypt};
use slog::Logger;
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Encodes, header-encrypts and writes one packet. Pure over any `Write`, so it is exercised in
/// tests against an in-memory buffer rather than a live socket.
pub fn send_packet<W: Write>(stream: &mut W, crypt: &mut SendCrypt, packet: &WorldPacket) -> io::Result<()> {
    let body = packet.body().as_slice();
    let mut frame = frame::encode_outbound(packet.opcode(), body);
    crypt.encrypt(&mut frame[..frame::OUTBOUND_HEADER_SIZE]);
    stream.write_all(&frame)
}

/// Reads, header-decrypts and frames exactly one packet. Pure over any `Read`.
pub fn receive_packet<R: Read>(stream: &mut R, crypt: &mut ReceiveCrypt) -> Result<WorldPacket, TransportError> {
    let mut first = [0u8; 1];
    stream.read_exact(&mut first)?;
    crypt.decrypt(&mut first);

    let shape_len = frame::peek_header_shape(first[0]);
    let mut rest = vec![0u8; shape_len - 1];
    stream.read_exact(&mut rest)?;
    crypt.decrypt(&mut rest);

    let mut header = Vec::with_capacity(shape_len);
    header.push(first[0]);
    header.extend_from_slice(&rest);

    let decoded = frame::decode_inbound_header(&header).map_err(|_| TransportError::Closed)?;

    let mut body = vec![0u8; decoded.body_len];
    stream.read_exact(&mut body)?;

    Ok(WorldPacket::from_body(decoded.opcode as u32, Codec::from_bytes(body)))
}

type Queue = Arc<(Mutex<VecDeque<WorldPacket>>, Condvar)>;

fn new_queue() -> Queue {
    Arc::new((Mutex::new(VecDeque::new()), Condvar::new()))
}

/// Owns the two I/O threads and the queues between them and the rest of the session. Dropping a
/// `Connection` stops both threads and joins them.
pub struct Connection {
    send_queue: Queue,
    receive_queue: Queue,
    running: Arc<AtomicBool>,
    sender_thread: Mutex<Option<thread::JoinHandle<()>>>,
    receiver_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Connection {
    /// Connects to `address`, spawning the sender and receiver threads. `key` is the session key
    /// established by the handshake (out of scope here); the sender thread arms both crypt
    /// halves with it immediately after the `CMSG_AUTH_SESSION` packet is written, and signals
    /// the receiver thread to do the same via a one-shot channel.
    pub fn connect(address: &str, key: Vec<u8>, log: Logger) -> io::Result<Self> {
        let read_stream = TcpStream::connect(address)?;
        let write_stream = read_stream.try_clone()?;
        read_stream.set_read_timeout(Some(POLL_TIMEOUT))?;
        slog::debug!(log, "connected to realm"; "address" => address);

        let send_queue = new_queue();
        let receive_queue = new_queue();
        let running = Arc::new(AtomicBool::new(true));
        let (arm_tx, arm_rx) = mpsc::channel::<Vec<u8>>();

        let sender_thread = {
            let queue = Arc::clone(&send_queue);
            let running = Arc::clone(&running);
            let log = log.clone();
            thread::spawn(move || run_sender_thread(write_stream, queue, running, SendCrypt::new(), key, arm_tx, log))
        };

        let receiver_thread = {
            let queue = Arc::clone(&receive_queue);
            let running = Arc::clone(&running);
            thread::spawn(move || run_receiver_thread(read_stream, queue, running, ReceiveCrypt::new(), arm_rx, log))
        };

        Ok(Connection {
            send_queue,
            receive_queue,
            running,
            sender_thread: Mutex::new(Some(sender_thread)),
            receiver_thread: Mutex::new(Some(receiver_thread)),
        })
    }

    pub fn enqueue_packet(&self, packet: WorldPacket) {
        let (lock, cvar) = &*self.send_queue;
        lock.lock().unwrap().push_back(packet);
        cvar.notify_one();
    }

    /// Non-blocking pop, for the `EVENT_PROCESS_INCOMING` drain loop.
    pub fn try_next_packet(&self) -> Option<WorldPacket> {
        let (lock, _) = &*self.receive_queue;
        lock.lock().unwrap().pop_front()
    }

    /// Stops and joins both I/O threads, draining both queues under their locks. Safe to call
    /// through a shared `Arc<Connection>`, since session callbacks only ever see one by
    /// reference.
    pub fn disconnect(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let (send_lock, send_cvar) = &*self.send_queue;
        send_lock.lock().unwrap().clear();
        send_cvar.notify_all();
        if let Some(handle) = self.sender_thread.lock().unwrap().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.receiver_thread.lock().unwrap().take() {
            let _ = handle.join();
        }
        let (receive_lock, _) = &*self.receive_queue;
        receive_lock.lock().unwrap().clear();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn run_sender_thread(
    mut stream: TcpStream,
    queue: Queue,
    running: Arc<AtomicBool>,
    mut crypt: SendCrypt,
    key: Vec<u8>,
    arm_tx: mpsc::Sender<Vec<u8>>,
    log: Logger,
) {
    let (lock, cvar) = &*queue;
    while running.load(Ordering::SeqCst) {
        let packet = {
            let mut guard = lock.lock().unwrap();
            loop {
                if let Some(packet) = guard.pop_front() {
                    break Some(packet);
                }
                if !running.load(Ordering::SeqCst) {
                    break None;
                }
                let (next_guard, timeout) = cvar.wait_timeout(guard, POLL_TIMEOUT).unwrap();
                guard = next_guard;
                if timeout.timed_out() {
                    break guard.pop_front();
                }
            }
        };

        let Some(packet) = packet else {
            continue;
        };

        let opcode = packet.opcode();
        if let Err(e) = send_packet(&mut stream, &mut crypt, &packet) {
            slog::warn!(log, "sender thread write failed"; "error" => %e);
            break;
        }
        slog::trace!(log, "packet sent"; "opcode" => opcode);

        if opcode == CMSG_AUTH_SESSION && !crypt.is_armed() {
            crypt.initialize(&key);
            let _ = arm_tx.send(key.clone());
            slog::debug!(log, "send cipher armed");
        }
    }
}

fn run_receiver_thread(
    mut stream: TcpStream,
    queue: Queue,
    running: Arc<AtomicBool>,
    mut crypt: ReceiveCrypt,
    arm_rx: mpsc::Receiver<Vec<u8>>,
    log: Logger,
) {
    while running.load(Ordering::SeqCst) {
        if !crypt.is_armed() {
            if let Ok(key) = arm_rx.try_recv() {
                crypt.initialize(&key);
                slog::debug!(log, "receive cipher armed");
            }
        }

        match receive_packet(&mut stream, &mut crypt) {
            Ok(packet) => {
                slog::trace!(log, "packet received"; "opcode" => packet.opcode());
                let (lock, _) = &*queue;
                lock.lock().unwrap().push_back(packet);
            }
            Err(TransportError::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue;
            }
            Err(e) => {
                slog::warn!(log, "receiver thread stopped"; "error" => %e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::CMSG_PING;
    use std::io::Cursor;

    #[test]
    fn send_packet_is_unencrypted_before_the_cipher_is_armed() {
        let mut crypt = SendCrypt::new();
        let mut wire = Vec::new();
        let mut packet = WorldPacket::new(CMSG_PING);
        packet.body_mut().append::<u32>(7);

        send_packet(&mut wire, &mut crypt, &packet).unwrap();
        assert_eq!(&wire[..frame::OUTBOUND_HEADER_SIZE], &frame::encode_outbound(CMSG_PING, &[7, 0, 0, 0])[..frame::OUTBOUND_HEADER_SIZE]);
    }

    #[test]
    fn send_packet_header_is_encrypted_once_armed_but_body_is_not() {
        let mut crypt = SendCrypt::new();
        crypt.initialize(b"session key");
        let mut wire = Vec::new();
        let mut packet = WorldPacket::new(CMSG_PING);
        packet.body_mut().append::<u32>(0xAABBCCDD);

        send_packet(&mut wire, &mut crypt, &packet).unwrap();
        let plain = frame::encode_outbound(CMSG_PING, &0xAABBCCDDu32.to_le_bytes());
        assert_ne!(&wire[..frame::OUTBOUND_HEADER_SIZE], &plain[..frame::OUTBOUND_HEADER_SIZE]);
        assert_eq!(&wire[frame::OUTBOUND_HEADER_SIZE..], &plain[frame::OUTBOUND_HEADER_SIZE..]);
    }

    #[test]
    fn receive_packet_round_trips_with_a_matching_cipher() {
        let mut send_crypt = SendCrypt::new();
        let mut receive_crypt = ReceiveCrypt::new();
        send_crypt.initialize(b"shared");
        receive_crypt.initialize(b"shared");

        let mut packet = WorldPacket::new(CMSG_PING);
        packet.body_mut().append::<u16>(99);

        // The receiver expects the reference's inbound header shapes (4/5-byte with a 2-byte
        // opcode), not the 6-byte outbound shape, so build the inbound wire form directly.
        let mut header = Vec::new();
        let body = packet.body().as_slice().to_vec();
        let size = (body.len() + 2) as u16;
        header.extend_from_slice(&size.to_be_bytes());
        header.extend_from_slice(&(CMSG_PING as u16).to_le_bytes());
        send_crypt.encrypt(&mut header);

        let mut wire = header;
        wire.extend_from_slice(&body);

        let mut cursor = Cursor::new(wire);
        let received = receive_packet(&mut cursor, &mut receive_crypt).unwrap();
        assert_eq!(received.opcode(), CMSG_PING);
        assert_eq!(received.body().as_slice(), &body[..]);
    }

    #[test]
    fn disarmed_receive_treats_the_wire_as_plaintext() {
        let mut crypt = ReceiveCrypt::new();
        let mut header = Vec::new();
        header.extend_from_slice(&2u16.to_be_bytes());
        header.extend_from_slice(&(CMSG_PING as u16).to_le_bytes());
        let mut cursor = Cursor::new(header);

        let received = receive_packet(&mut cursor, &mut crypt).unwrap();
        assert_eq!(received.opcode(), CMSG_PING);
        assert_eq!(received.body().size(), 0);
    }
}
