//! Device — a controllable thing in the home.
//!
//! A device is either managed locally (its state lives only in this
//! backend) or mirrored to an external home-automation hub, in which case
//! state changes are also sent to the hub using the device's
//! `entity_id`.

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};
use crate::id::{DeviceId, RoomId};
use crate::time::Timestamp;

/// Broad device category. Drives which operations make sense
/// (e.g. only thermostats accept a temperature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Thermostat,
    Switch,
    Sensor,
    /// Anything we do not recognise; kept so foreign records survive.
    #[serde(other)]
    Other,
}

impl DeviceKind {
    /// Lowercase wire/storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Switch => "switch",
            Self::Sensor => "sensor",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "light" => Self::Light,
            "thermostat" => Self::Thermostat,
            "switch" => Self::Switch,
            "sensor" => Self::Sensor,
            _ => Self::Other,
        })
    }
}

/// A physical or virtual device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Room this device belongs to, if assigned.
    pub room_id: Option<RoomId>,
    /// Current on/off state.
    pub is_on: bool,
    /// Set point, only meaningful for thermostats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// When true, state changes must be mirrored to the remote hub.
    pub is_home_assistant: bool,
    /// External hub identifier (e.g. `light.kitchen`). Required when
    /// `is_home_assistant` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub created_at: Timestamp,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `is_home_assistant` is set without an `entity_id`
    ///   ([`ValidationError::MissingEntityId`])
    pub fn validate(&self) -> Result<(), HomeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.is_home_assistant && self.entity_id.is_none() {
            return Err(ValidationError::MissingEntityId.into());
        }
        Ok(())
    }

    /// Whether this device mirrors its state to the remote hub.
    ///
    /// True only when the hub flag is set *and* an entity id is present;
    /// records that predate validation may carry the flag alone.
    #[must_use]
    pub fn is_hub_linked(&self) -> bool {
        self.is_home_assistant && self.entity_id.is_some()
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    kind: Option<DeviceKind>,
    room_id: Option<RoomId>,
    is_on: bool,
    temperature: Option<f64>,
    is_home_assistant: bool,
    entity_id: Option<String>,
    created_at: Option<Timestamp>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub fn is_on(mut self, is_on: bool) -> Self {
        self.is_on = is_on;
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Mark the device as hub-mirrored with the given hub entity id.
    #[must_use]
    pub fn home_assistant(mut self, entity_id: impl Into<String>) -> Self {
        self.is_home_assistant = true;
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Device, HomeError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(DeviceKind::Light),
            room_id: self.room_id,
            is_on: self.is_on,
            temperature: self.temperature,
            is_home_assistant: self.is_home_assistant,
            entity_id: self.entity_id,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_valid_device_when_name_provided() {
        let device = Device::builder().name("Living Room Light").build().unwrap();
        assert_eq!(device.name, "Living Room Light");
        assert_eq!(device.kind, DeviceKind::Light);
        assert!(!device.is_on);
        assert!(!device.is_home_assistant);
        assert!(device.room_id.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Device::builder().build();
        assert!(matches!(
            result,
            Err(HomeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_require_entity_id_for_hub_linked_devices() {
        let mut device = Device::builder().name("Hub Light").build().unwrap();
        device.is_home_assistant = true;
        assert!(matches!(
            device.validate(),
            Err(HomeError::Validation(ValidationError::MissingEntityId))
        ));
    }

    #[test]
    fn should_build_hub_linked_device_with_entity_id() {
        let device = Device::builder()
            .name("Hub Light")
            .home_assistant("light.kitchen")
            .build()
            .unwrap();
        assert!(device.is_hub_linked());
        assert_eq!(device.entity_id.as_deref(), Some("light.kitchen"));
    }

    #[test]
    fn should_build_thermostat_with_temperature() {
        let device = Device::builder()
            .name("Hallway Thermostat")
            .kind(DeviceKind::Thermostat)
            .temperature(21.5)
            .is_on(true)
            .build()
            .unwrap();
        assert_eq!(device.kind, DeviceKind::Thermostat);
        assert_eq!(device.temperature, Some(21.5));
        assert!(device.is_on);
    }

    #[test]
    fn should_serialize_with_wire_field_names() {
        let device = Device::builder()
            .name("Lamp")
            .home_assistant("light.lamp")
            .build()
            .unwrap();
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["isOn"], serde_json::json!(false));
        assert_eq!(json["isHomeAssistant"], serde_json::json!(true));
        assert_eq!(json["entityId"], serde_json::json!("light.lamp"));
        assert_eq!(json["type"], serde_json::json!("light"));
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let device = Device::builder()
            .name("Lamp")
            .kind(DeviceKind::Switch)
            .is_on(true)
            .build()
            .unwrap();
        let json = serde_json::to_string(&device).unwrap();
        let parsed: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, device.id);
        assert_eq!(parsed.kind, DeviceKind::Switch);
        assert!(parsed.is_on);
    }

    #[test]
    fn should_parse_unknown_device_type_as_other() {
        let json = serde_json::json!({
            "id": DeviceId::new(),
            "name": "Mystery",
            "type": "vacuum",
            "roomId": null,
            "isOn": false,
            "isHomeAssistant": false,
            "createdAt": crate::time::now(),
        });
        let device: Device = serde_json::from_value(json).unwrap();
        assert_eq!(device.kind, DeviceKind::Other);
    }
}
