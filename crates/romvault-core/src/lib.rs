//! romvault Core - save-state persistence.
//!
//! This crate owns the identity model for emulator save slots, the relational
//! stores that persist them, and the service that translates transport
//! requests (base64 payloads, textual identity fields) into store calls.

pub mod codec;
pub mod error;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use record::{SaveId, SaveKey, SaveMeta, DEFAULT_SAVE_TYPE, DEFAULT_SLOT};
pub use service::{SaveService, SlotPolicy};
pub use store::{connect, PostgresSaveStore, SaveStore, SqliteSaveStore, StoreConfig};
