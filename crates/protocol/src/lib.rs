//! Protocol definitions for persistence notifications between participants
//!
//! This crate defines typed message wrappers around the generic `Message`
//! type from proven-engine. A request carries a message kind and a
//! transaction descriptor; every request is answered by a reply carrying a
//! (usually empty) descriptor and a result code.

pub mod messages;
pub mod responses;

pub use messages::{DtmRequest, MessageKind, ParseError};
pub use responses::{DtmReply, ResultCode};

use proven_engine::{MessageType, MockEngine};

/// Opcode of persistence notification requests
pub const DTM_REQUEST_OPCODE: u32 = 1100;

/// Opcode of the replies to `DTM_REQUEST_OPCODE`
pub const DTM_REPLY_OPCODE: u32 = 1101;

/// Request message type
pub const DTM_REQUEST: MessageType = MessageType {
    opcode: DTM_REQUEST_OPCODE,
    name: "dtm request",
    is_reply: false,
};

/// Reply message type
pub const DTM_REPLY: MessageType = MessageType {
    opcode: DTM_REPLY_OPCODE,
    name: "dtm reply",
    is_reply: true,
};

/// Register the request and reply message types with the engine
///
/// Safe to call more than once.
pub fn register_message_types(engine: &MockEngine) -> proven_engine::Result<()> {
    engine.register_message_type(DTM_REQUEST)?;
    engine.register_message_type(DTM_REPLY)?;
    Ok(())
}

/// Check whether an opcode belongs to the reply family of this protocol
pub fn is_reply_opcode(opcode: u32) -> bool {
    opcode == DTM_REPLY_OPCODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        let engine = MockEngine::new();
        register_message_types(&engine).unwrap();
        register_message_types(&engine).unwrap();

        assert_eq!(engine.message_type(DTM_REQUEST_OPCODE), Some(DTM_REQUEST));
        assert_eq!(engine.message_type(DTM_REPLY_OPCODE), Some(DTM_REPLY));
    }

    #[test]
    fn test_reply_family() {
        assert!(is_reply_opcode(DTM_REPLY_OPCODE));
        assert!(!is_reply_opcode(DTM_REQUEST_OPCODE));
    }
}
