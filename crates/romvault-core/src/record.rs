//! Save identity and metadata types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Save type used when the caller does not name one (battery-backed RAM).
pub const DEFAULT_SAVE_TYPE: &str = "sram";

/// Slot used when the caller does not name one.
pub const DEFAULT_SLOT: i32 = 0;

/// Store-assigned surrogate identifier of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveId(pub i64);

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SaveId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(SaveId)
    }
}

/// The identity triple addressing a save slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveKey {
    /// Game (ROM file name) the save belongs to.
    pub game: String,
    /// Save category, e.g. `sram` or `state`.
    pub save_type: String,
    /// Slot within the category.
    pub slot: i32,
}

impl SaveKey {
    /// Create a key from explicit parts.
    pub fn new(game: impl Into<String>, save_type: impl Into<String>, slot: i32) -> Self {
        Self {
            game: game.into(),
            save_type: save_type.into(),
            slot,
        }
    }

    /// Create a key for the default save type and slot of a game.
    pub fn sram(game: impl Into<String>) -> Self {
        Self::new(game, DEFAULT_SAVE_TYPE, DEFAULT_SLOT)
    }
}

impl fmt::Display for SaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.game, self.save_type, self.slot)
    }
}

/// Save metadata as returned by listings. Never carries the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveMeta {
    pub id: SaveId,
    pub key: SaveKey,
    /// Payload length in bytes.
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
