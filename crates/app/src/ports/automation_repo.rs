//! Automation repository port — persistence for automation rules.

use std::future::Future;

use techhome_domain::automation::AutomationRule;
use techhome_domain::error::HomeError;
use techhome_domain::id::AutomationId;

/// Repository for persisting and querying [`AutomationRule`]s.
pub trait AutomationRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, HomeError>> + Send;

    /// Get all rules.
    fn get_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, HomeError>> + Send;

    /// Get all enabled rules. This is the query the scheduler rebuilds
    /// its job table from.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<AutomationRule>, HomeError>> + Send;

    /// Update an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), HomeError>> + Send;
}
