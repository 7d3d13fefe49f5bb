//! Automation executor — applies one rule's action to its target device.
//!
//! Execution is fire-and-forget: it runs unattended from a timer, so no
//! outcome is returned to any caller. Every guard failure (missing or
//! malformed device reference, unknown device, unsupported command) is a
//! logged skip, never an error, and one misbehaving rule can never take
//! down the rest of the schedule.
//!
//! Hub-linked devices get the matching hub command *before* the local
//! write, but a hub failure does not block that write: the registry is
//! kept at-least-locally consistent and the divergence is left visible in
//! the logs.

use std::str::FromStr;

use techhome_domain::automation::AutomationRule;
use techhome_domain::event::{Event, EventType};
use techhome_domain::id::DeviceId;

use crate::ports::{DeviceRepository, EventPublisher, HubClient, HubVerb};

/// Applies a triggered rule's action to its target device.
pub struct Executor<DR, H, P> {
    devices: DR,
    hub: H,
    publisher: P,
}

impl<DR, H, P> Executor<DR, H, P>
where
    DR: DeviceRepository + Send + Sync,
    H: HubClient + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Create a new executor.
    pub fn new(devices: DR, hub: H, publisher: P) -> Self {
        Self {
            devices,
            hub,
            publisher,
        }
    }

    /// Apply `rule`'s action to its target device.
    ///
    /// The rule is a snapshot taken at schedule time; the device is read
    /// fresh. The state write is last-writer-wins against concurrent user
    /// toggles.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn execute(&self, rule: &AutomationRule) {
        if !rule.enabled {
            tracing::debug!("skipping disabled automation");
            return;
        }

        let Some(raw_id) = rule.action.device_id.as_deref() else {
            tracing::warn!("automation has no target device, skipping");
            return;
        };
        let Ok(device_id) = DeviceId::from_str(raw_id) else {
            tracing::warn!(device = raw_id, "invalid device reference, skipping");
            return;
        };

        let device = match self.devices.get_by_id(device_id).await {
            Ok(Some(device)) => device,
            Ok(None) => {
                tracing::warn!(device = %device_id, "target device not found, skipping");
                return;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load target device");
                return;
            }
        };

        let Some(new_state) = rule.action.command.target_state(device.is_on) else {
            tracing::warn!(command = %rule.action.command, "unsupported command, skipping");
            return;
        };

        if device.is_hub_linked() {
            self.mirror_to_hub(&device, new_state).await;
        }

        if let Err(err) = self.devices.set_state(device.id, new_state).await {
            tracing::error!(error = %err, device = %device.name, "failed to persist device state");
            return;
        }
        tracing::info!(
            device = %device.name,
            state = if new_state { "on" } else { "off" },
            "automation executed"
        );

        let _ = self
            .publisher
            .publish(Event::new(
                EventType::AutomationTriggered,
                serde_json::json!({
                    "automation_id": rule.id,
                    "automation_name": rule.name,
                    "device_id": device.id,
                    "is_on": new_state,
                }),
            ))
            .await;
    }

    /// Send the hub command matching `new_state`. Failures are warnings:
    /// the local write proceeds regardless, and the divergence stays
    /// observable in the logs.
    async fn mirror_to_hub(&self, device: &techhome_domain::device::Device, new_state: bool) {
        let entity_id = device.entity_id.as_deref().unwrap_or_default();
        let verb = HubVerb::for_state(new_state);
        match self.hub.send_command(entity_id, verb).await {
            Ok(resp) if resp.is_success() => {
                tracing::info!(entity = entity_id, %verb, "hub command accepted");
            }
            Ok(resp) => {
                tracing::warn!(
                    entity = entity_id,
                    %verb,
                    status = resp.status,
                    body = %resp.body,
                    "hub refused command, updating local state anyway"
                );
            }
            Err(err) => {
                tracing::warn!(
                    entity = entity_id,
                    %verb,
                    error = %err,
                    "hub unreachable, updating local state anyway"
                );
            }
        }
    }
}
