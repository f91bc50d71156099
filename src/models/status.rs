// src/models/status.rs
use serde::{Deserialize, Serialize};

/// Outcome of one probe against the game server. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub online: bool,
    pub players_online: u32,
    pub players_max: u32,
    pub version: String,
}

impl StatusResult {
    /// Canonical failure result: unreachable and genuinely offline look
    /// the same to readers.
    pub fn offline() -> Self {
        Self {
            online: false,
            players_online: 0,
            players_max: 0,
            version: "?".to_string(),
        }
    }
}

/// What `GET /status` serves: the last probe outcome plus its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub online: bool,
    pub players_online: u32,
    pub players_max: u32,
    pub version: String,
    pub updated_at: u64,
}
