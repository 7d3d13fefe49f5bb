//! Device log — a record of one action applied to one device.
//!
//! The `device` field is a loose reference: either a local [`DeviceId`] in
//! string form or a hub entity id (e.g. `light.kitchen`). Analytics
//! resolves both to display names.
//!
//! [`DeviceId`]: crate::id::DeviceId

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One logged device action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLog {
    /// Username of whoever acted; `"unknown"` when unauthenticated.
    pub user: String,
    /// Device reference: local id string or hub entity id.
    pub device: String,
    /// Action name, e.g. `"toggle"`, `"set_temperature"`.
    pub action: String,
    /// Outcome description, e.g. `"on"`, `"off"`, `"21.5"`.
    pub result: String,
    pub timestamp: Timestamp,
}

impl DeviceLog {
    /// Build a log entry stamped with the current time, substituting
    /// `"unknown"` for any empty field.
    #[must_use]
    pub fn record(user: &str, device: &str, action: &str, result: &str) -> Self {
        let or_unknown = |s: &str| {
            if s.is_empty() {
                "unknown".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            user: or_unknown(user),
            device: or_unknown(device),
            action: or_unknown(action),
            result: or_unknown(result),
            timestamp: crate::time::now(),
        }
    }
}

/// Action count for one grouping key (a user or a device).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCount {
    /// Grouping key: username or device reference.
    pub key: String,
    pub actions: i64,
}

/// Count of one action name within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}
