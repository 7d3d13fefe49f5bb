//! Condition — the *when* part of an automation rule.

use serde::{Deserialize, Serialize};

/// Structured condition payload.
///
/// Time conditions are the only shape the backend evaluates. Everything
/// else (device-link payloads, free-form predicates) is preserved
/// verbatim under [`Condition::Generic`] so clients can round-trip what
/// they stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// A wall-clock time of day.
    Time(TimeCondition),
    /// Any other payload; stored but never evaluated here.
    Generic(serde_json::Value),
}

/// Time-of-day condition carrying an `HH:MM` string.
///
/// Older clients stored the time under a `value` key; both spellings are
/// accepted on input and normalised to `time` on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCondition {
    #[serde(alias = "value")]
    pub time: String,
}

impl TimeCondition {
    /// Parse the stored string as `(hour, minute)`.
    ///
    /// Accepts one- or two-digit fields (`"7:05"`, `"07:05"`). Returns
    /// `None` for anything out of range or not of the `H:M` shape.
    #[must_use]
    pub fn hour_minute(&self) -> Option<(u32, u32)> {
        let (h, m) = self.time.split_once(':')?;
        let hour: u32 = h.trim().parse().ok()?;
        let minute: u32 = m.trim().parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
}

impl Condition {
    /// Shorthand for a time condition.
    #[must_use]
    pub fn at(time: impl Into<String>) -> Self {
        Self::Time(TimeCondition { time: time.into() })
    }

    /// An empty generic condition, for rules that carry no payload.
    #[must_use]
    pub fn none() -> Self {
        Self::Generic(serde_json::Value::Null)
    }

    /// The `(hour, minute)` this condition names, if it is a parseable
    /// time condition.
    #[must_use]
    pub fn time_of_day(&self) -> Option<(u32, u32)> {
        match self {
            Self::Time(t) => t.hour_minute(),
            Self::Generic(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_two_digit_time() {
        assert_eq!(Condition::at("07:00").time_of_day(), Some((7, 0)));
    }

    #[test]
    fn should_parse_single_digit_fields() {
        assert_eq!(Condition::at("7:5").time_of_day(), Some((7, 5)));
    }

    #[test]
    fn should_reject_out_of_range_hour() {
        assert_eq!(Condition::at("24:00").time_of_day(), None);
    }

    #[test]
    fn should_reject_out_of_range_minute() {
        assert_eq!(Condition::at("12:60").time_of_day(), None);
    }

    #[test]
    fn should_reject_non_numeric_time() {
        assert_eq!(Condition::at("sunrise").time_of_day(), None);
        assert_eq!(Condition::at("").time_of_day(), None);
    }

    #[test]
    fn should_accept_midnight_and_end_of_day() {
        assert_eq!(Condition::at("0:0").time_of_day(), Some((0, 0)));
        assert_eq!(Condition::at("23:59").time_of_day(), Some((23, 59)));
    }

    #[test]
    fn should_deserialize_time_key() {
        let c: Condition = serde_json::from_value(serde_json::json!({"time": "08:15"})).unwrap();
        assert_eq!(c.time_of_day(), Some((8, 15)));
    }

    #[test]
    fn should_deserialize_legacy_value_key() {
        let c: Condition = serde_json::from_value(serde_json::json!({"value": "08:15"})).unwrap();
        assert_eq!(c.time_of_day(), Some((8, 15)));
    }

    #[test]
    fn should_normalise_legacy_key_on_output() {
        let c: Condition = serde_json::from_value(serde_json::json!({"value": "08:15"})).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json, serde_json::json!({"time": "08:15"}));
    }

    #[test]
    fn should_keep_unrecognised_payloads_generic() {
        let payload = serde_json::json!({"sourceDeviceId": "a", "targetDeviceId": "b"});
        let c: Condition = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(c, Condition::Generic(payload));
        assert_eq!(c.time_of_day(), None);
    }

    #[test]
    fn should_keep_unparseable_time_string_as_time_condition() {
        let c: Condition = serde_json::from_value(serde_json::json!({"time": "later"})).unwrap();
        assert!(matches!(c, Condition::Time(_)));
        assert_eq!(c.time_of_day(), None);
    }
}
