//! Event — an in-process record of something that happened.
//!
//! Events are produced when device state changes, automation rules are
//! created/updated/deleted/toggled, and when an automation fires. The
//! scheduler listens for automation changes to know when to rebuild its
//! job table.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::Timestamp;

/// Kind of change an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A device's state was written (by a user or an automation).
    DeviceStateChanged,
    /// An automation rule was created, updated, deleted, or toggled.
    AutomationChanged,
    /// An automation fired and its action was applied.
    AutomationTriggered,
}

/// An immutable change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    /// Free-form payload; shape depends on `event_type`.
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            data,
            timestamp: crate::time::now(),
        }
    }
}
