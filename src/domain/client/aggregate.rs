//! Client entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ClientId;

/// Whether a client may use the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
}

impl ClientStatus {
    /// Only active clients have a billing position.
    pub fn is_billable(&self) -> bool {
        matches!(self, ClientStatus::Active)
    }
}

/// A gym client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub status: ClientStatus,
}

impl Client {
    pub fn new(id: ClientId, name: impl Into<String>, status: ClientStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
        }
    }

    pub fn is_billable(&self) -> bool {
        self.status.is_billable()
    }
}
