//! Automation service — use-cases for managing automation rules.
//!
//! Every mutation publishes an [`EventType::AutomationChanged`] event;
//! the scheduler listens for those to rebuild its job table, so nothing
//! here talks to the scheduler directly.

use techhome_domain::automation::AutomationRule;
use techhome_domain::error::{HomeError, NotFoundError};
use techhome_domain::event::{Event, EventType};
use techhome_domain::id::AutomationId;

use crate::ports::{AutomationRepository, EventPublisher};

/// Application service for automation-rule CRUD operations.
pub struct AutomationService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> AutomationService<R, P>
where
    R: AutomationRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given ports.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_automation(&self, rule: AutomationRule) -> Result<AutomationRule, HomeError> {
        rule.validate()?;
        let created = self.repo.create(rule).await?;
        self.publish_changed(created.id, "created").await;
        Ok(created)
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(&self, id: AutomationId) -> Result<AutomationRule, HomeError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<AutomationRule>, HomeError> {
        self.repo.get_all().await
    }

    /// Get all enabled rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_enabled(&self) -> Result<Vec<AutomationRule>, HomeError> {
        self.repo.get_enabled().await
    }

    /// Update an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule))]
    pub async fn update_automation(&self, rule: AutomationRule) -> Result<AutomationRule, HomeError> {
        rule.validate()?;
        let updated = self.repo.update(rule).await?;
        self.publish_changed(updated.id, "updated").await;
        Ok(updated)
    }

    /// Enable or disable a rule.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when the rule does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: AutomationId,
        enabled: bool,
    ) -> Result<AutomationRule, HomeError> {
        let mut rule = self.get_automation(id).await?;
        rule.enabled = enabled;
        let updated = self.repo.update(rule).await?;
        self.publish_changed(id, if enabled { "enabled" } else { "disabled" })
            .await;
        Ok(updated)
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), HomeError> {
        self.repo.delete(id).await?;
        self.publish_changed(id, "deleted").await;
        Ok(())
    }

    async fn publish_changed(&self, id: AutomationId, change: &str) {
        let _ = self
            .publisher
            .publish(Event::new(
                EventType::AutomationChanged,
                serde_json::json!({"automation_id": id, "change": change}),
            ))
            .await;
    }
}
