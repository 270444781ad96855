//! A `WorldPacket` is a [`Codec`] tagged with the opcode it carries — the unit the sender and
//! receiver threads pass around. The opcode is carried separately from the body bytes; the
//! [`crate::frame::Framer`] is what actually lays opcode and body out on the wire.

use relay_codec::Codec;

#[derive(Debug)]
pub struct WorldPacket {
    opcode: u32,
    body: Codec,
}

impl WorldPacket {
    pub fn new(opcode: u32) -> Self {
        WorldPacket {
            opcode,
            body: Codec::new(),
        }
    }

    pub fn with_capacity(opcode: u32, capacity: usize) -> Self {
        WorldPacket {
            opcode,
            body: Codec::with_capacity(capacity),
        }
    }

    pub fn from_body(opcode: u32, body: Codec) -> Self {
        WorldPacket { opcode, body }
    }

    pub fn opcode(&self) -> u32 {
        self.opcode
    }

    pub fn body(&self) -> &Codec {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Codec {
        &mut self.body
    }

    pub fn into_body(self) -> Codec {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_opcode_and_body_independently() {
        let mut packet = WorldPacket::new(crate::opcode::CMSG_PING);
        packet.body_mut().append::<u32>(42);
        assert_eq!(packet.opcode(), crate::opcode::CMSG_PING);
        assert_eq!(packet.body().size(), 4);
    }
}
