//! Device service — use-cases for managing devices.
//!
//! Besides plain CRUD, this service owns the user-facing state changes
//! (toggle, temperature). Those also append to the device-usage log and
//! publish a [`EventType::DeviceStateChanged`] event.

use techhome_domain::device::{Device, DeviceKind};
use techhome_domain::device_log::DeviceLog;
use techhome_domain::error::{HomeError, NotFoundError, ValidationError};
use techhome_domain::event::{Event, EventType};
use techhome_domain::id::DeviceId;

use crate::ports::{DeviceLogRepository, DeviceRepository, EventPublisher};

/// Application service for device CRUD and state changes.
pub struct DeviceService<R, L, P> {
    repo: R,
    logs: L,
    publisher: P,
}

impl<R, L, P> DeviceService<R, L, P>
where
    R: DeviceRepository,
    L: DeviceLogRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given ports.
    pub fn new(repo: R, logs: L, publisher: P) -> Self {
        Self {
            repo,
            logs,
            publisher,
        }
    }

    /// Create a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create_device(&self, device: Device) -> Result<Device, HomeError> {
        device.validate()?;
        self.repo.create(device).await
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, HomeError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, HomeError> {
        self.repo.get_all().await
    }

    /// Update an existing device.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, device))]
    pub async fn update_device(&self, device: Device) -> Result<Device, HomeError> {
        device.validate()?;
        self.repo.update(device).await
    }

    /// Delete a device by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), HomeError> {
        self.repo.delete(id).await
    }

    /// Flip a device's on/off state on behalf of `actor`.
    ///
    /// The write is last-writer-wins against a concurrently firing
    /// automation; whichever lands second sticks.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when the device does not exist, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_device(&self, id: DeviceId, actor: &str) -> Result<Device, HomeError> {
        let mut device = self.get_device(id).await?;
        let new_state = !device.is_on;
        self.repo.set_state(id, new_state).await?;
        device.is_on = new_state;

        let result = if new_state { "on" } else { "off" };
        self.append_log(actor, &device, "toggle", result).await;
        self.publish_state_change(&device).await;
        Ok(device)
    }

    /// Set a thermostat's target temperature on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] for an unknown device,
    /// [`ValidationError::NotAThermostat`] for any other device kind, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_temperature(
        &self,
        id: DeviceId,
        temperature: f64,
        actor: &str,
    ) -> Result<Device, HomeError> {
        let mut device = self.get_device(id).await?;
        if device.kind != DeviceKind::Thermostat {
            return Err(ValidationError::NotAThermostat.into());
        }
        device.temperature = Some(temperature);
        let device = self.repo.update(device).await?;

        self.append_log(actor, &device, "set_temperature", &temperature.to_string())
            .await;
        Ok(device)
    }

    /// Best-effort log append; a failed write must never fail the state
    /// change that already happened.
    async fn append_log(&self, actor: &str, device: &Device, action: &str, result: &str) {
        let entry = DeviceLog::record(actor, &device.id.to_string(), action, result);
        if let Err(err) = self.logs.insert(entry).await {
            tracing::warn!(error = %err, "failed to append device log entry");
        }
    }

    async fn publish_state_change(&self, device: &Device) {
        let _ = self
            .publisher
            .publish(Event::new(
                EventType::DeviceStateChanged,
                serde_json::json!({
                    "device_id": device.id,
                    "is_on": device.is_on,
                }),
            ))
            .await;
    }
}
