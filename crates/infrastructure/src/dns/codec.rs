use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;

pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Serialize a Message to wire format bytes
pub fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
    message
        .to_vec()
        .map_err(|e| DomainError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8], server: &str) -> Result<Message, DomainError> {
    Message::from_vec(bytes).map_err(|e| DomainError::MalformedResponse {
        server: server.to_string(),
        reason: e.to_string(),
    })
}

/// Overwrite the transaction id in an encoded message.
#[inline]
pub fn set_wire_id(wire: &mut [u8], id: u16) {
    if wire.len() >= 2 {
        wire[..2].copy_from_slice(&id.to_be_bytes());
    }
}

#[inline]
pub fn wire_id(wire: &[u8]) -> Option<u16> {
    (wire.len() >= 2).then(|| u16::from_be_bytes([wire[0], wire[1]]))
}
