//! Boundary translation between transport requests and the save store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::codec;
use crate::error::{Error, Result};
use crate::record::{SaveId, SaveKey, SaveMeta, DEFAULT_SAVE_TYPE, DEFAULT_SLOT};
use crate::store::SaveStore;

/// How a malformed slot value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// A non-numeric slot is rejected with [`Error::InvalidSlot`].
    #[default]
    Strict,
    /// A non-numeric slot is read as slot 0.
    Lenient,
}

impl SlotPolicy {
    /// Resolve a textual slot. Absent or blank values are the default slot.
    pub fn parse(self, raw: Option<&str>) -> Result<i32> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(DEFAULT_SLOT),
            Some(raw) => raw,
        };
        match (raw.parse::<i32>(), self) {
            (Ok(slot), _) => Ok(slot),
            (Err(_), SlotPolicy::Lenient) => Ok(DEFAULT_SLOT),
            (Err(_), SlotPolicy::Strict) => Err(Error::InvalidSlot(raw.to_string())),
        }
    }
}

/// Resolve a save type, falling back to the default for absent or empty values.
///
/// Any other value is stored as given.
pub fn resolve_save_type(save_type: Option<&str>) -> &str {
    match save_type {
        None | Some("") => DEFAULT_SAVE_TYPE,
        Some(save_type) => save_type,
    }
}

/// Save operations as exposed to the transport boundary.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Clone)]
pub struct SaveService {
    store: Arc<dyn SaveStore>,
    deadline: Duration,
    slot_policy: SlotPolicy,
}

impl SaveService {
    /// Create a service over a store with a 30 second operation deadline.
    pub fn new(store: Arc<dyn SaveStore>) -> Self {
        Self {
            store,
            deadline: Duration::from_secs(30),
            slot_policy: SlotPolicy::default(),
        }
    }

    /// Set the deadline applied to every store operation.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the policy for malformed slot values.
    pub fn with_slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.slot_policy = policy;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn SaveStore> {
        &self.store
    }

    /// Run a store operation under the deadline. Dropping the timed-out future
    /// hands its pooled connection back.
    async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.deadline, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Store operation timed out"
                );
                Err(Error::Timeout(self.deadline))
            }
        }
    }

    /// Check that the store answers.
    pub async fn health(&self) -> Result<()> {
        self.bounded(self.store.health_check()).await
    }

    /// List save metadata for a game. Unknown games yield an empty list.
    pub async fn list_saves(&self, game: &str) -> Result<Vec<SaveMeta>> {
        self.bounded(self.store.list_by_game(game)).await
    }

    /// Read a save and return its payload encoded for transport.
    pub async fn read_save(
        &self,
        game: &str,
        save_type: Option<&str>,
        slot: Option<&str>,
    ) -> Result<String> {
        let key = SaveKey::new(game, resolve_save_type(save_type), self.slot_policy.parse(slot)?);
        let data = self.bounded(self.store.get_data(&key)).await?;
        Ok(codec::encode(&data))
    }

    /// Decode a transport payload and store it under the resolved key.
    ///
    /// Malformed payloads are rejected before the store is touched.
    pub async fn write_save(
        &self,
        game: &str,
        encoded: &str,
        save_type: Option<&str>,
        slot: Option<i32>,
    ) -> Result<()> {
        let data = codec::decode(encoded)?;
        let key = SaveKey::new(game, resolve_save_type(save_type), slot.unwrap_or(DEFAULT_SLOT));
        self.bounded(self.store.upsert(&key, &data)).await
    }

    /// Delete a save by its textual surrogate id. Missing saves are not an error.
    pub async fn delete_save(&self, id: &str) -> Result<()> {
        let id: SaveId = id
            .parse()
            .map_err(|_| Error::InvalidIdentifier(id.to_string()))?;
        self.bounded(self.store.delete(id)).await
    }
}
