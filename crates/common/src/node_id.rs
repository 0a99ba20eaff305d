//! Node identity
//!
//! Every service taking part in a transaction is named by a stable two-part
//! identifier: a container (the kind/process family of the service) and a
//! key within that container.

use crate::error::{DescriptorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a node or service instance
///
/// Ordered by container first, then key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId {
    container: u64,
    key: u64,
}

impl NodeId {
    /// Create a node identity from its two parts
    pub const fn new(container: u64, key: u64) -> Self {
        Self { container, key }
    }

    /// Container part of the identity
    pub fn container(&self) -> u64 {
        self.container
    }

    /// Key part of the identity
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Parse from the `container:key` hex form produced by `Display`
    pub fn parse(s: &str) -> Result<Self> {
        let (container, key) = s
            .split_once(':')
            .ok_or_else(|| DescriptorError::InvalidNodeId(s.to_string()))?;

        let container = u64::from_str_radix(container, 16)
            .map_err(|_| DescriptorError::InvalidNodeId(s.to_string()))?;
        let key =
            u64::from_str_radix(key, 16).map_err(|_| DescriptorError::InvalidNodeId(s.to_string()))?;

        Ok(Self::new(container, key))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:x}", self.container, self.key)
    }
}
