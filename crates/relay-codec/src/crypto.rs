//! The packet stream cipher. A position-dependent running-key cipher (RC4-family: a
//! key-scheduled 256-byte permutation table advanced by two running indices) seeded once from
//! the session key established during the handshake, then applied byte-for-byte to every packet
//! header and body that crosses the wire afterwards.
//!
//! Split into independently owned halves so each can be moved into its own I/O thread — see
//! `relay_client::session::io` for how the send half gets armed and the receive half is told to
//! catch up via a one-shot channel.

#[derive(Clone)]
struct KeyStream {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl KeyStream {
    fn new(key: &[u8]) -> Self {
        assert!(!key.is_empty(), "cannot arm a packet cipher with an empty key");
        let mut state = [0u8; 256];
        for (idx, slot) in state.iter_mut().enumerate() {
            *slot = idx as u8;
        }
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }
        KeyStream { state, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);
        let idx = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[idx as usize]
    }

    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.next_byte();
        }
    }
}

/// The send-direction half. Disarmed (a no-op transform) until [`SendCrypt::initialize`] is
/// called, which happens right after the auth-session packet is serialized for the wire.
#[derive(Clone, Default)]
pub struct SendCrypt(Option<KeyStream>);

impl SendCrypt {
    pub fn new() -> Self {
        SendCrypt(None)
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    pub fn initialize(&mut self, key: &[u8]) {
        self.0 = Some(KeyStream::new(key));
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// In place, position-dependent: the n-th byte encrypted is always the n-th byte emitted.
    pub fn encrypt(&mut self, data: &mut [u8]) {
        if let Some(stream) = &mut self.0 {
            stream.apply(data);
        }
    }
}

/// The receive-direction half. Same shape as [`SendCrypt`] — XOR stream ciphers are their own
/// inverse, so "decrypt" and "encrypt" are the identical transform under the hood.
#[derive(Clone, Default)]
pub struct ReceiveCrypt(Option<KeyStream>);

impl ReceiveCrypt {
    pub fn new() -> Self {
        ReceiveCrypt(None)
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    pub fn initialize(&mut self, key: &[u8]) {
        self.0 = Some(KeyStream::new(key));
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }

    pub fn decrypt(&mut self, data: &mut [u8]) {
        if let Some(stream) = &mut self.0 {
            stream.apply(data);
        }
    }
}

/// Convenience bundle for code that wants to construct both halves from one session key and
/// hand them off together before splitting ownership across threads.
pub struct PacketCrypt {
    pub send: SendCrypt,
    pub receive: ReceiveCrypt,
}

impl PacketCrypt {
    pub fn disarmed() -> Self {
        PacketCrypt {
            send: SendCrypt::new(),
            receive: ReceiveCrypt::new(),
        }
    }

    pub fn initialize(&mut self, key: &[u8]) {
        self.send.initialize(key);
        self.receive.initialize(key);
    }

    pub fn split(self) -> (SendCrypt, ReceiveCrypt) {
        (self.send, self.receive)
    }
}

impl Default for PacketCrypt {
    fn default() -> Self {
        Self::disarmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_cipher_is_the_identity_transform() {
        let mut send = SendCrypt::new();
        let mut data = b"hello world".to_vec();
        let original = data.clone();
        send.encrypt(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn encrypt_then_decrypt_with_matching_keys_is_the_identity() {
        let key = b"a shared session key";
        let mut send = SendCrypt::new();
        let mut receive = ReceiveCrypt::new();
        send.initialize(key);
        receive.initialize(key);

        let original = b"CMSG_AUTH_SESSION payload".to_vec();
        let mut wire = original.clone();
        send.encrypt(&mut wire);
        assert_ne!(wire, original);
        receive.decrypt(&mut wire);
        assert_eq!(wire, original);
    }

    #[test]
    fn cipher_is_position_dependent_not_a_fixed_substitution() {
        let mut send = SendCrypt::new();
        send.initialize(b"key");
        let mut a = vec![0u8; 4];
        let mut b = vec![0u8; 4];
        send.encrypt(&mut a);
        send.encrypt(&mut b);
        assert_ne!(a, b, "two identical plaintexts at different stream positions must differ");
    }

    #[test]
    fn reset_disarms_the_cipher() {
        let mut send = SendCrypt::new();
        send.initialize(b"key");
        assert!(send.is_armed());
        send.reset();
        assert!(!send.is_armed());
        let mut data = vec![1, 2, 3];
        send.encrypt(&mut data);
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn packet_crypt_initializes_both_halves_from_one_key() {
        let mut bundle = PacketCrypt::disarmed();
        bundle.initialize(b"shared");
        let (mut send, mut receive) = bundle.split();
        let original = b"opcode body".to_vec();
        let mut wire = original.clone();
        send.encrypt(&mut wire);
        receive.decrypt(&mut wire);
        assert_eq!(wire, original);
    }
}
