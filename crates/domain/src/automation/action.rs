//! Action — the *what* part of an automation rule.

use serde::{Deserialize, Serialize};

/// Command applied to the target device when a rule fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    TurnOn,
    TurnOff,
    /// Flip the device's current state. Also the fallback when a rule
    /// omits its command.
    #[default]
    Toggle,
    /// Unrecognised command preserved verbatim; skipped at execution time.
    #[serde(untagged)]
    Other(String),
}

impl Command {
    /// The on/off state this command drives a device to, given the
    /// device's current state. `None` for unsupported commands.
    #[must_use]
    pub fn target_state(&self, current: bool) -> Option<bool> {
        match self {
            Self::TurnOn => Some(true),
            Self::TurnOff => Some(false),
            Self::Toggle => Some(!current),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TurnOn => f.write_str("turn_on"),
            Self::TurnOff => f.write_str("turn_off"),
            Self::Toggle => f.write_str("toggle"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Structured action payload.
///
/// `device_id` stays a string here: the reference is validated when the
/// rule fires, not when it is stored, so rules with dangling or malformed
/// references survive and are skipped with a log line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub command: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compute_target_state_for_turn_on_and_off() {
        assert_eq!(Command::TurnOn.target_state(false), Some(true));
        assert_eq!(Command::TurnOn.target_state(true), Some(true));
        assert_eq!(Command::TurnOff.target_state(true), Some(false));
        assert_eq!(Command::TurnOff.target_state(false), Some(false));
    }

    #[test]
    fn should_negate_current_state_for_toggle() {
        assert_eq!(Command::Toggle.target_state(false), Some(true));
        assert_eq!(Command::Toggle.target_state(true), Some(false));
    }

    #[test]
    fn should_have_no_target_state_for_unknown_commands() {
        assert_eq!(Command::Other("dim".to_string()).target_state(true), None);
    }

    #[test]
    fn should_default_missing_command_to_toggle() {
        let action: Action =
            serde_json::from_value(serde_json::json!({"deviceId": "abc"})).unwrap();
        assert_eq!(action.command, Command::Toggle);
        assert_eq!(action.device_id.as_deref(), Some("abc"));
    }

    #[test]
    fn should_deserialize_known_commands_from_wire_names() {
        let action: Action =
            serde_json::from_value(serde_json::json!({"command": "turn_off"})).unwrap();
        assert_eq!(action.command, Command::TurnOff);
    }

    #[test]
    fn should_preserve_unknown_commands() {
        let action: Action =
            serde_json::from_value(serde_json::json!({"command": "set_brightness"})).unwrap();
        assert_eq!(action.command, Command::Other("set_brightness".to_string()));
    }

    #[test]
    fn should_roundtrip_action_through_serde_json() {
        let action = Action {
            device_id: Some("d-1".to_string()),
            command: Command::TurnOn,
            value: Some(serde_json::json!(true)),
        };
        let json = serde_json::to_string(&action).unwrap();
        let parsed: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn should_serialize_device_id_in_camel_case() {
        let action = Action {
            device_id: Some("d-1".to_string()),
            ..Action::default()
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["deviceId"], serde_json::json!("d-1"));
    }

    #[test]
    fn should_display_commands_with_wire_names() {
        assert_eq!(Command::TurnOn.to_string(), "turn_on");
        assert_eq!(Command::Other("dim".to_string()).to_string(), "dim");
    }
}
