//! Common types for the distributed transaction manager
//!
//! This crate defines:
//! - Node identities (two-part service identifiers)
//! - Transaction IDs (originator identity + sequence)
//! - Participants and their persistence state
//! - Transaction descriptors exchanged between participants

mod descriptor;
mod error;
mod node_id;
mod participant;
mod transaction_id;

pub use descriptor::TransactionDescriptor;
pub use error::{DescriptorError, Result};
pub use node_id::NodeId;
pub use participant::{Participant, PersistenceState};
pub use transaction_id::TransactionId;
