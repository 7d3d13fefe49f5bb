//! Automation rules — condition → action definitions with an enabled flag.
//!
//! A rule stores *when* something should happen ([`Condition`]) and *what*
//! should happen ([`Action`]). Only enabled, time-conditioned rules are
//! picked up by the scheduler; other kinds are stored for clients but not
//! actively evaluated by the backend.

mod action;
mod condition;

pub use action::{Action, Command};
pub use condition::{Condition, TimeCondition};

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};
use crate::id::AutomationId;

/// Category of rule, mirroring what clients create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Fires at a fixed wall-clock time every day. The only kind the
    /// scheduler acts on.
    Time,
    /// Mirrors one device's state onto another. Stored only.
    DeviceLink,
    /// Fires when an arbitrary condition holds. Stored only.
    Condition,
}

/// A stored automation definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: AutomationId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub condition: Condition,
    pub action: Action,
    pub enabled: bool,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HomeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// The daily trigger time for this rule, if it is a time rule with a
    /// parseable `HH:MM` condition.
    #[must_use]
    pub fn trigger_time(&self) -> Option<(u32, u32)> {
        if self.kind != RuleKind::Time {
            return None;
        }
        self.condition.time_of_day()
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    kind: Option<RuleKind>,
    condition: Option<Condition>,
    action: Option<Action>,
    enabled: Option<bool>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: RuleKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<AutomationRule, HomeError> {
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(RuleKind::Time),
            condition: self.condition.unwrap_or_else(Condition::none),
            action: self.action.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morning_rule() -> AutomationRule {
        AutomationRule::builder()
            .name("Wake up lights")
            .kind(RuleKind::Time)
            .condition(Condition::at("07:00"))
            .action(Action {
                device_id: Some(crate::id::DeviceId::new().to_string()),
                command: Command::TurnOn,
                value: None,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_rule_with_defaults() {
        let rule = morning_rule();
        assert!(rule.enabled);
        assert_eq!(rule.kind, RuleKind::Time);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = AutomationRule::builder().build();
        assert!(matches!(
            result,
            Err(HomeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_expose_trigger_time_for_time_rules() {
        assert_eq!(morning_rule().trigger_time(), Some((7, 0)));
    }

    #[test]
    fn should_not_expose_trigger_time_for_other_rule_kinds() {
        let mut rule = morning_rule();
        rule.kind = RuleKind::DeviceLink;
        assert_eq!(rule.trigger_time(), None);
    }

    #[test]
    fn should_not_expose_trigger_time_for_unparseable_condition() {
        let mut rule = morning_rule();
        rule.condition = Condition::at("sunrise");
        assert_eq!(rule.trigger_time(), None);
    }

    #[test]
    fn should_serialize_kind_with_wire_names() {
        let json = serde_json::to_value(RuleKind::DeviceLink).unwrap();
        assert_eq!(json, serde_json::json!("device-link"));
    }

    #[test]
    fn should_roundtrip_rule_through_serde_json() {
        let rule = morning_rule();
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: AutomationRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, rule.id);
        assert_eq!(parsed.trigger_time(), Some((7, 0)));
        assert_eq!(parsed.action.command, Command::TurnOn);
    }

    #[test]
    fn should_deserialize_rule_from_wire_shape() {
        let json = serde_json::json!({
            "id": AutomationId::new(),
            "name": "Evening lamp",
            "type": "time",
            "condition": {"time": "19:30"},
            "action": {"deviceId": "abc", "command": "toggle"},
            "enabled": false
        });
        let rule: AutomationRule = serde_json::from_value(json).unwrap();
        assert!(!rule.enabled);
        assert_eq!(rule.trigger_time(), Some((19, 30)));
        assert_eq!(rule.action.device_id.as_deref(), Some("abc"));
    }
}
