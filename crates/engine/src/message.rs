//! Message types for the mock engine
//!
//! This module defines the frame format carried by the mock engine: an
//! opcode naming the registered message type, an opaque body and string
//! headers for metadata.

use std::collections::HashMap;

/// Registered message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType {
    /// Opcode carried by every message of this type
    pub opcode: u32,

    /// Human readable name for logging
    pub name: &'static str,

    /// Whether this type is a reply to some request type
    pub is_reply: bool,
}

/// Message that flows through the mock engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Opcode of the registered message type
    pub opcode: u32,

    /// Message body (serialized data)
    pub body: Vec<u8>,

    /// Headers for metadata
    pub headers: HashMap<String, String>,
}

impl Message {
    /// Create a new message with body and headers
    pub fn new(opcode: u32, body: Vec<u8>, headers: HashMap<String, String>) -> Self {
        Self {
            opcode,
            body,
            headers,
        }
    }

    /// Create a message with just body
    pub fn with_body(opcode: u32, body: Vec<u8>) -> Self {
        Self::new(opcode, body, HashMap::new())
    }

    /// Add a header to the message
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get header value
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|s| s.as_str())
    }
}
