//! Hub client port — commands against the remote home-automation hub.
//!
//! Some devices are mirrored to an external hub (Home Assistant). When the
//! executor changes such a device's state it first sends the matching
//! command to the hub; the concrete HTTP client lives in an adapter crate.

use std::future::Future;

use techhome_domain::error::HomeError;

/// The two service verbs the hub accepts for on/off devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubVerb {
    TurnOn,
    TurnOff,
}

impl HubVerb {
    /// The verb that drives a device to `state`.
    #[must_use]
    pub fn for_state(state: bool) -> Self {
        if state {
            Self::TurnOn
        } else {
            Self::TurnOff
        }
    }

    /// Wire name of the verb as the hub spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
        }
    }
}

impl std::fmt::Display for HubVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw outcome of a hub call. Callers decide whether a non-success status
/// is fatal; the executor deliberately treats it as a warning only.
#[derive(Debug, Clone)]
pub struct HubResponse {
    pub status: u16,
    pub body: String,
}

impl HubResponse {
    /// Whether the hub accepted the command (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client for the remote home-automation hub.
pub trait HubClient {
    /// Send a state-change command for the given hub entity.
    ///
    /// An `Err` means the hub was unreachable; a returned [`HubResponse`]
    /// with a non-2xx status means the hub answered but refused.
    fn send_command(
        &self,
        entity_id: &str,
        verb: HubVerb,
    ) -> impl Future<Output = Result<HubResponse, HomeError>> + Send;

    /// Fetch the hub's full entity-state listing (proxied to clients).
    fn states(&self) -> impl Future<Output = Result<serde_json::Value, HomeError>> + Send;
}

impl<T: HubClient + Send + Sync> HubClient for std::sync::Arc<T> {
    fn send_command(
        &self,
        entity_id: &str,
        verb: HubVerb,
    ) -> impl Future<Output = Result<HubResponse, HomeError>> + Send {
        (**self).send_command(entity_id, verb)
    }

    fn states(&self) -> impl Future<Output = Result<serde_json::Value, HomeError>> + Send {
        (**self).states()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_state_to_verb() {
        assert_eq!(HubVerb::for_state(true), HubVerb::TurnOn);
        assert_eq!(HubVerb::for_state(false), HubVerb::TurnOff);
    }

    #[test]
    fn should_spell_verbs_like_the_hub() {
        assert_eq!(HubVerb::TurnOn.to_string(), "turn_on");
        assert_eq!(HubVerb::TurnOff.to_string(), "turn_off");
    }

    #[test]
    fn should_treat_2xx_as_success() {
        let ok = HubResponse {
            status: 200,
            body: String::new(),
        };
        let refused = HubResponse {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(ok.is_success());
        assert!(!refused.is_success());
    }
}
