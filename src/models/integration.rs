use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state of one meeting platform, as reported by the auth status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConnection {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub is_expiring_soon: bool,
    #[serde(default)]
    pub needs_reconnect: bool,
    #[serde(default)]
    pub last_sync_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionHealth {
    NotConnected,
    Connected,
    ExpiringSoon,
    NeedsReconnect,
}

impl ConnectionHealth {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionHealth::NotConnected => "Not connected",
            ConnectionHealth::Connected => "Connected",
            ConnectionHealth::ExpiringSoon => "Expiring soon",
            ConnectionHealth::NeedsReconnect => "Reconnect required",
        }
    }
}

impl PlatformConnection {
    pub fn health(&self) -> ConnectionHealth {
        if !self.connected {
            ConnectionHealth::NotConnected
        } else if self.is_expired || self.needs_reconnect {
            ConnectionHealth::NeedsReconnect
        } else if self.is_expiring_soon {
            ConnectionHealth::ExpiringSoon
        } else {
            ConnectionHealth::Connected
        }
    }
}

/// Platform id -> connection. Sorted by id so the panel order is stable.
pub type IntegrationStatus = BTreeMap<String, PlatformConnection>;

pub fn platform_label(id: &str) -> &str {
    match id {
        "zoom" => "Zoom",
        "google" => "Google Meet",
        "microsoft" => "Microsoft Teams",
        other => other,
    }
}
