//! Analytics service — read models over the device-usage log.
//!
//! The heavy lifting (grouping, counting) happens in the log repository;
//! this service resolves device references to display names and shapes
//! the results for the API. A device reference is either a local device
//! id or a hub entity id, and both are resolved.

use std::str::FromStr;

use serde::Serialize;

use techhome_domain::device_log::{ActionCount, DeviceLog};
use techhome_domain::error::HomeError;
use techhome_domain::id::DeviceId;
use techhome_domain::time::Timestamp;

use crate::ports::{DeviceLogRepository, DeviceRepository};

/// How many entries the recent-actions feed returns.
const RECENT_LIMIT: i64 = 5;

/// How many actions the top-actions queries return.
const TOP_LIMIT: i64 = 3;

/// Action count for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUsage {
    pub user: String,
    pub actions: i64,
}

/// Action count for one device, with its reference resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceUsage {
    pub device: String,
    pub name: String,
    pub actions: i64,
}

/// The single most frequent action of a group, if the group has any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostFrequent {
    pub action: Option<String>,
    pub count: i64,
}

/// One entry of the recent-actions feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecentAction {
    pub user: String,
    pub action: String,
    pub device_name: String,
    pub result: String,
    pub timestamp: Timestamp,
}

/// Application service for usage analytics.
pub struct AnalyticsService<L, D> {
    logs: L,
    devices: D,
}

impl<L, D> AnalyticsService<L, D>
where
    L: DeviceLogRepository,
    D: DeviceRepository,
{
    /// Create a new service backed by the given ports.
    pub fn new(logs: L, devices: D) -> Self {
        Self { logs, devices }
    }

    /// Action counts per user, most active first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn usage_per_user(&self) -> Result<Vec<UserUsage>, HomeError> {
        let counts = self.logs.usage_per_user().await?;
        Ok(counts
            .into_iter()
            .map(|c| UserUsage {
                user: c.key,
                actions: c.actions,
            })
            .collect())
    }

    /// Action counts per device, most used first, with resolved names.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    pub async fn usage_per_device(&self) -> Result<Vec<DeviceUsage>, HomeError> {
        let counts = self.logs.usage_per_device().await?;
        let mut rows = Vec::with_capacity(counts.len());
        for c in counts {
            let name = self.resolve_name(&c.key).await?;
            rows.push(DeviceUsage {
                device: c.key,
                name,
                actions: c.actions,
            });
        }
        Ok(rows)
    }

    /// The most frequent action for one device reference.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn most_frequent_device_action(
        &self,
        device: &str,
    ) -> Result<MostFrequent, HomeError> {
        let top = self.logs.top_actions_for_device(device, 1).await?;
        Ok(Self::first_or_empty(top))
    }

    /// The most frequent action for one user.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn most_frequent_user_action(&self, user: &str) -> Result<MostFrequent, HomeError> {
        let top = self.logs.top_actions_for_user(user, 1).await?;
        Ok(Self::first_or_empty(top))
    }

    /// The top actions for one device reference.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn top_device_actions(&self, device: &str) -> Result<Vec<ActionCount>, HomeError> {
        self.logs.top_actions_for_device(device, TOP_LIMIT).await
    }

    /// The top actions for one user.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn top_user_actions(&self, user: &str) -> Result<Vec<ActionCount>, HomeError> {
        self.logs.top_actions_for_user(user, TOP_LIMIT).await
    }

    /// The latest log entries, newest first, with resolved device names.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    pub async fn recent_actions(&self) -> Result<Vec<RecentAction>, HomeError> {
        let entries = self.logs.recent(RECENT_LIMIT).await?;
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let device_name = self.resolve_name(&entry.device).await?;
            rows.push(RecentAction {
                user: entry.user,
                action: entry.action,
                device_name,
                result: entry.result,
                timestamp: entry.timestamp,
            });
        }
        Ok(rows)
    }

    /// Dump the full log as CSV, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn export_csv(&self) -> Result<String, HomeError> {
        let entries = self.logs.get_all().await?;
        let mut out = String::from("user,device,action,result,timestamp\n");
        for entry in &entries {
            out.push_str(&csv_row(entry));
            out.push('\n');
        }
        Ok(out)
    }

    fn first_or_empty(top: Vec<ActionCount>) -> MostFrequent {
        match top.into_iter().next() {
            Some(first) => MostFrequent {
                action: Some(first.action),
                count: first.count,
            },
            None => MostFrequent {
                action: None,
                count: 0,
            },
        }
    }

    /// Resolve a device reference (local id or hub entity id) to its
    /// display name; falls back to the raw reference.
    async fn resolve_name(&self, reference: &str) -> Result<String, HomeError> {
        let device = match DeviceId::from_str(reference) {
            Ok(id) => self.devices.get_by_id(id).await?,
            Err(_) => self.devices.find_by_entity_id(reference).await?,
        };
        Ok(device.map_or_else(|| reference.to_string(), |d| d.name))
    }
}

fn csv_row(entry: &DeviceLog) -> String {
    [
        csv_field(&entry.user),
        csv_field(&entry.device),
        csv_field(&entry.action),
        csv_field(&entry.result),
        entry.timestamp.to_rfc3339(),
    ]
    .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
