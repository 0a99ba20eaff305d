//! Typed replies to persistence notifications

use crate::DTM_REPLY_OPCODE;
use crate::messages::ParseError;
use proven_common::TransactionDescriptor;
use proven_engine::Message;
use std::collections::HashMap;
use std::fmt;

/// Result code carried by a reply
///
/// Zero is success; failures are negative errno-style values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResultCode(i32);

impl ResultCode {
    pub const OK: Self = Self(0);
    /// Rejected by an authorization check
    pub const EPERM: Self = Self(-1);
    /// Storage or transport I/O failure
    pub const EIO: Self = Self(-5);
    /// Out of resources
    pub const ENOMEM: Self = Self(-12);
    /// Request could not be understood
    pub const EINVAL: Self = Self(-22);
    /// Protocol-level failure
    pub const EPROTO: Self = Self(-71);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reply to a persistence notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtmReply {
    /// Descriptor returned to the sender, empty unless there is one to return
    pub descriptor: TransactionDescriptor,
    /// Outcome of the request
    pub result: ResultCode,
}

impl DtmReply {
    /// Successful reply with the empty descriptor
    pub fn success() -> Self {
        Self {
            descriptor: TransactionDescriptor::empty(),
            result: ResultCode::OK,
        }
    }

    /// Failed reply with the empty descriptor
    pub fn failure(result: ResultCode) -> Self {
        Self {
            descriptor: TransactionDescriptor::empty(),
            result,
        }
    }

    /// Convert to a raw Message for sending
    pub fn into_message(self) -> Result<Message, ParseError> {
        let body = serde_json::to_vec(&self.descriptor)?;

        let mut headers = HashMap::with_capacity(1);
        headers.insert("dtm_rc".to_string(), self.result.to_string());

        Ok(Message::new(DTM_REPLY_OPCODE, body, headers))
    }

    /// Parse from a raw Message
    pub fn from_message(msg: Message) -> Result<Self, ParseError> {
        if msg.opcode != DTM_REPLY_OPCODE {
            return Err(ParseError::UnexpectedOpcode {
                expected: DTM_REPLY_OPCODE,
                actual: msg.opcode,
            });
        }

        let rc_str = msg
            .get_header("dtm_rc")
            .ok_or(ParseError::MissingHeader("dtm_rc"))?;
        let result = rc_str
            .parse()
            .map(ResultCode::new)
            .map_err(|_| ParseError::InvalidResultCode(rc_str.to_string()))?;

        let descriptor = serde_json::from_slice(&msg.body)?;

        Ok(Self { descriptor, result })
    }
}
