//! JSON request and response shapes of the HTTP API.

use chrono::{DateTime, Utc};
use romvault_core::SaveMeta;
use serde::{Deserialize, Serialize};

/// Save metadata as listed by `GET /api/saves/:rom`. Carries no payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveJson {
    pub id: i64,
    pub rom_name: String,
    pub save_type: String,
    pub slot: i32,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SaveMeta> for SaveJson {
    fn from(meta: SaveMeta) -> Self {
        Self {
            id: meta.id.0,
            rom_name: meta.key.game,
            save_type: meta.key.save_type,
            slot: meta.key.slot,
            size: meta.size,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Query parameters of `GET /api/saves/:rom/data`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadSaveParams {
    /// Save type, defaults to `sram`.
    #[serde(rename = "type")]
    pub save_type: Option<String>,
    /// Slot, kept textual so the slot policy decides how to read it.
    pub slot: Option<String>,
}

/// Save payload, base64 encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveDataJson {
    pub data: String,
}

/// Body of `POST /api/saves/:rom`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteSaveRequest {
    #[serde(default)]
    pub save_type: Option<String>,
    #[serde(default)]
    pub slot: Option<i32>,
    /// Base64 encoded payload.
    pub data: String,
}

/// Acknowledgement of a write or delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    pub status: String,
    pub version: String,
    /// Store backend name.
    pub store: String,
    pub store_connected: bool,
}
