//! # techhome-adapter-home-assistant
//!
//! Remote hub adapter built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `HubClient` port defined in `techhome-app`
//! - Speak the hub's REST API: bearer-token auth,
//!   `POST /api/services/light/{turn_on|turn_off}` with an `entity_id`
//!   payload, and `GET /api/states`
//! - Enforce a short request timeout so a slow hub cannot stall a timer
//!   callback for long
//!
//! ## Dependency rule
//! Depends on `techhome-app` (for the port trait) and `techhome-domain`
//! (for the error type). Never leaks reqwest types to callers.

use std::time::Duration;

use techhome_app::ports::{HubClient, HubResponse, HubVerb};
use techhome_domain::error::HomeError;

/// Default request timeout. Hub calls run inside timer callbacks, so
/// they are kept short.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors originating from the hub HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum HubClientError {
    /// The request could not be built or sent (connect failure, timeout).
    #[error("hub request failed")]
    Request(#[from] reqwest::Error),
}

impl From<HubClientError> for HomeError {
    fn from(err: HubClientError) -> Self {
        Self::Hub(Box::new(err))
    }
}

/// Configuration for the hub client.
pub struct Config {
    /// Base URL of the hub, e.g. `http://homeassistant.local:8123`.
    pub base_url: String,
    /// Long-lived bearer token.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Config {
    /// Build a [`HaClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubClientError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn build(self) -> Result<HaClient, HubClientError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(HaClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token: self.token,
        })
    }
}

/// Home Assistant REST client.
pub struct HaClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HaClient {
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", self.token),
        )
    }
}

impl HubClient for HaClient {
    async fn send_command(&self, entity_id: &str, verb: HubVerb) -> Result<HubResponse, HomeError> {
        let url = format!("{}/api/services/light/{}", self.base_url, verb.as_str());
        let payload = serde_json::json!({ "entity_id": entity_id });

        tracing::debug!(%url, entity = entity_id, "sending hub command");
        let response = self
            .authorized(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(HubClientError::from)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(HubClientError::from)?;
        Ok(HubResponse { status, body })
    }

    async fn states(&self) -> Result<serde_json::Value, HomeError> {
        let url = format!("{}/api/states", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(HubClientError::from)?;
        let states = response
            .json::<serde_json::Value>()
            .await
            .map_err(HubClientError::from)?;
        Ok(states)
    }
}
