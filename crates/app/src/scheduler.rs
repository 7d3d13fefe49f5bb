//! Automation scheduler — mirrors enabled time rules as recurring jobs.
//!
//! The scheduler owns an in-memory job table keyed by rule id. [`resync`]
//! rebuilds that table wholesale from the rule store: every current timer
//! is torn down and one recurring daily timer is registered per enabled
//! rule with a parseable `HH:MM` time condition. There is no incremental
//! diffing, which makes resync trivially idempotent and safe to call
//! arbitrarily often.
//!
//! Resync is driven by automation changes: every create/update/delete/
//! toggle publishes an [`EventType::AutomationChanged`] event and
//! [`spawn_resync_listener`] rebuilds the table on receipt.
//!
//! A timer firing spawns the executor invocation on its own task, so a
//! concurrent resync that aborts the timer cannot cancel an execution
//! that is already in flight — teardown only affects future triggers.
//!
//! [`resync`]: Scheduler::resync

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use techhome_domain::automation::AutomationRule;
use techhome_domain::error::HomeError;
use techhome_domain::event::{Event, EventType};
use techhome_domain::id::AutomationId;

use crate::executor::Executor;
use crate::ports::{AutomationRepository, DeviceRepository, EventPublisher, HubClient};

/// Snapshot of one registered job, for tests and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub automation_id: AutomationId,
    pub hour: u32,
    pub minute: u32,
}

struct JobEntry {
    hour: u32,
    minute: u32,
    handle: JoinHandle<()>,
}

/// Keeps the set of active timers synchronized with enabled time rules.
pub struct Scheduler<AR, DR, H, P> {
    rules: AR,
    executor: Arc<Executor<DR, H, P>>,
    jobs: Mutex<HashMap<AutomationId, JobEntry>>,
    started: AtomicBool,
}

impl<AR, DR, H, P> Scheduler<AR, DR, H, P>
where
    AR: AutomationRepository + Send + Sync,
    DR: DeviceRepository + Send + Sync + 'static,
    H: HubClient + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a scheduler over the given rule store and executor.
    pub fn new(rules: AR, executor: Arc<Executor<DR, H, P>>) -> Self {
        Self {
            rules,
            executor,
            jobs: Mutex::new(HashMap::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Perform the initial schedule build. No-op if already started.
    ///
    /// # Errors
    ///
    /// Propagates a storage error from the first rule read; the caller
    /// should log and continue (the next automation change retries).
    pub async fn start(&self) -> Result<(), HomeError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.resync().await
    }

    /// Rebuild the job table from the rule store.
    ///
    /// Reads all enabled rules, then tears down every current timer and
    /// registers a fresh recurring timer per eligible rule. Rules without
    /// a parseable daily trigger time are skipped with a debug log; one
    /// rule never blocks the others.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the rule store cannot be read. The
    /// previous job table is left untouched in that case, so firing
    /// continues from the last good state.
    pub async fn resync(&self) -> Result<(), HomeError> {
        let rules = self.rules.get_enabled().await?;

        let mut jobs = self.jobs.lock().expect("scheduler job table poisoned");
        for (_, entry) in jobs.drain() {
            entry.handle.abort();
        }

        for rule in rules {
            let Some((hour, minute)) = rule.trigger_time() else {
                tracing::debug!(rule = %rule.name, "rule has no daily trigger time, not scheduling");
                continue;
            };
            let id = rule.id;
            let handle = tokio::spawn(run_job(rule, hour, minute, Arc::clone(&self.executor)));
            jobs.insert(
                id,
                JobEntry {
                    hour,
                    minute,
                    handle,
                },
            );
        }

        tracing::info!(jobs = jobs.len(), "schedule rebuilt");
        Ok(())
    }

    /// Snapshot of the current job table.
    #[must_use]
    pub fn jobs(&self) -> Vec<ScheduledJob> {
        let jobs = self.jobs.lock().expect("scheduler job table poisoned");
        let mut snapshot: Vec<_> = jobs
            .iter()
            .map(|(id, entry)| ScheduledJob {
                automation_id: *id,
                hour: entry.hour,
                minute: entry.minute,
            })
            .collect();
        snapshot.sort_by_key(|job| job.automation_id.as_uuid());
        snapshot
    }
}

impl<AR, DR, H, P> Drop for Scheduler<AR, DR, H, P> {
    fn drop(&mut self) {
        if let Ok(mut jobs) = self.jobs.lock() {
            for (_, entry) in jobs.drain() {
                entry.handle.abort();
            }
        }
    }
}

/// Recurring timer for one rule: sleep until the next `hour:minute`, fire
/// the executor on a detached task, repeat. The rule snapshot is the one
/// taken at schedule time; a changed rule gets a fresh job via resync.
async fn run_job<DR, H, P>(
    rule: AutomationRule,
    hour: u32,
    minute: u32,
    executor: Arc<Executor<DR, H, P>>,
) where
    DR: DeviceRepository + Send + Sync + 'static,
    H: HubClient + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    loop {
        let now = Local::now();
        let next = next_occurrence(now, hour, minute);
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        tracing::debug!(rule = %rule.name, "timer fired");
        let snapshot = rule.clone();
        let executor = Arc::clone(&executor);
        // Detached: aborting this timer must not cancel an in-flight run.
        tokio::spawn(async move {
            executor.execute(&snapshot).await;
        });
    }
}

/// The next wall-clock `hour:minute` strictly after `now`.
///
/// Walks forward day by day so a nonexistent local time (DST spring
/// forward) falls through to the next valid day.
fn next_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let mut date = now.date_naive();
    for _ in 0..4 {
        if let Some(naive) = date.and_hms_opt(hour, minute, 0) {
            if let Some(candidate) = Local.from_local_datetime(&naive).earliest() {
                if candidate > now {
                    return candidate;
                }
            }
        }
        date = date.succ_opt().unwrap_or(date);
    }
    // Unreachable for validated times; fall back to a day from now.
    now + chrono::Duration::days(1)
}

/// Listen for automation changes on the event bus and resync on each one.
///
/// A resync failure is logged and swallowed: the previous schedule keeps
/// running and the next automation change retries.
pub fn spawn_resync_listener<AR, DR, H, P>(
    scheduler: Arc<Scheduler<AR, DR, H, P>>,
    mut events: broadcast::Receiver<Event>,
) -> JoinHandle<()>
where
    AR: AutomationRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    H: HubClient + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event.event_type == EventType::AutomationChanged => {
                    if let Err(err) = scheduler.resync().await {
                        tracing::warn!(error = %err, "schedule refresh failed, keeping current jobs");
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events may include automation changes; rebuild.
                    tracing::warn!(skipped, "event stream lagged, rebuilding schedule");
                    if let Err(err) = scheduler.resync().await {
                        tracing::warn!(error = %err, "schedule refresh failed, keeping current jobs");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::ports::{HubResponse, HubVerb};
    use std::future::Future;
    use techhome_domain::automation::{Action, Command, Condition, RuleKind};
    use techhome_domain::device::Device;
    use techhome_domain::id::DeviceId;

    // ── In-memory rule store ───────────────────────────────────────

    #[derive(Default)]
    struct InMemoryRuleRepo {
        store: Mutex<HashMap<AutomationId, AutomationRule>>,
        fail_reads: AtomicBool,
    }

    impl InMemoryRuleRepo {
        fn with(rules: Vec<AutomationRule>) -> Self {
            let map: HashMap<_, _> = rules.into_iter().map(|r| (r.id, r)).collect();
            Self {
                store: Mutex::new(map),
                fail_reads: AtomicBool::new(false),
            }
        }

        fn remove(&self, id: AutomationId) {
            self.store.lock().unwrap().remove(&id);
        }

        fn put(&self, rule: AutomationRule) {
            self.store.lock().unwrap().insert(rule.id, rule);
        }
    }

    impl AutomationRepository for InMemoryRuleRepo {
        fn create(
            &self,
            rule: AutomationRule,
        ) -> impl Future<Output = Result<AutomationRule, HomeError>> + Send {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            async { Ok(rule) }
        }
        fn get_by_id(
            &self,
            id: AutomationId,
        ) -> impl Future<Output = Result<Option<AutomationRule>, HomeError>> + Send {
            let r = self.store.lock().unwrap().get(&id).cloned();
            async { Ok(r) }
        }
        fn get_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, HomeError>> + Send {
            let r: Vec<_> = self.store.lock().unwrap().values().cloned().collect();
            async { Ok(r) }
        }
        fn get_enabled(
            &self,
        ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeError>> + Send {
            let failing = self.fail_reads.load(Ordering::SeqCst);
            let r: Vec<_> = self
                .store
                .lock()
                .unwrap()
                .values()
                .filter(|rule| rule.enabled)
                .cloned()
                .collect();
            async move {
                if failing {
                    Err(HomeError::Storage("rule store unreachable".into()))
                } else {
                    Ok(r)
                }
            }
        }
        fn update(
            &self,
            rule: AutomationRule,
        ) -> impl Future<Output = Result<AutomationRule, HomeError>> + Send {
            self.store.lock().unwrap().insert(rule.id, rule.clone());
            async { Ok(rule) }
        }
        fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), HomeError>> + Send {
            self.store.lock().unwrap().remove(&id);
            async { Ok(()) }
        }
    }

    // ── Minimal executor collaborators ─────────────────────────────

    struct NullDeviceRepo;

    impl DeviceRepository for NullDeviceRepo {
        fn create(&self, device: Device) -> impl Future<Output = Result<Device, HomeError>> + Send {
            async { Ok(device) }
        }
        fn get_by_id(
            &self,
            _id: DeviceId,
        ) -> impl Future<Output = Result<Option<Device>, HomeError>> + Send {
            async { Ok(None) }
        }
        fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeError>> + Send {
            async { Ok(vec![]) }
        }
        fn find_by_entity_id(
            &self,
            _entity_id: &str,
        ) -> impl Future<Output = Result<Option<Device>, HomeError>> + Send {
            async { Ok(None) }
        }
        fn update(&self, device: Device) -> impl Future<Output = Result<Device, HomeError>> + Send {
            async { Ok(device) }
        }
        fn set_state(
            &self,
            _id: DeviceId,
            _is_on: bool,
        ) -> impl Future<Output = Result<(), HomeError>> + Send {
            async { Ok(()) }
        }
        fn delete(&self, _id: DeviceId) -> impl Future<Output = Result<(), HomeError>> + Send {
            async { Ok(()) }
        }
    }

    struct NullHub;

    impl HubClient for NullHub {
        fn send_command(
            &self,
            _entity_id: &str,
            _verb: HubVerb,
        ) -> impl Future<Output = Result<HubResponse, HomeError>> + Send {
            async {
                Ok(HubResponse {
                    status: 200,
                    body: String::new(),
                })
            }
        }
        fn states(&self) -> impl Future<Output = Result<serde_json::Value, HomeError>> + Send {
            async { Ok(serde_json::json!([])) }
        }
    }

    struct NullPublisher;

    impl EventPublisher for NullPublisher {
        fn publish(&self, _event: Event) -> impl Future<Output = Result<(), HomeError>> + Send {
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn time_rule(name: &str, time: &str, enabled: bool) -> AutomationRule {
        AutomationRule::builder()
            .name(name)
            .kind(RuleKind::Time)
            .condition(Condition::at(time))
            .action(Action {
                device_id: Some(DeviceId::new().to_string()),
                command: Command::TurnOn,
                value: None,
            })
            .enabled(enabled)
            .build()
            .unwrap()
    }

    fn make_scheduler(
        rules: Vec<AutomationRule>,
    ) -> Scheduler<InMemoryRuleRepo, NullDeviceRepo, NullHub, NullPublisher> {
        let executor = Arc::new(Executor::new(NullDeviceRepo, NullHub, NullPublisher));
        Scheduler::new(InMemoryRuleRepo::with(rules), executor)
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_register_one_job_per_enabled_time_rule() {
        let morning = time_rule("Morning", "07:00", true);
        let evening = time_rule("Evening", "19:30", true);
        let scheduler = make_scheduler(vec![morning.clone(), evening.clone()]);

        scheduler.resync().await.unwrap();

        let jobs = scheduler.jobs();
        assert_eq!(jobs.len(), 2);
        let by_id = |id| jobs.iter().find(|j| j.automation_id == id).unwrap();
        assert_eq!((by_id(morning.id).hour, by_id(morning.id).minute), (7, 0));
        assert_eq!((by_id(evening.id).hour, by_id(evening.id).minute), (19, 30));
    }

    #[tokio::test]
    async fn should_not_schedule_disabled_rules() {
        let disabled = time_rule("Disabled", "07:00", false);
        let scheduler = make_scheduler(vec![disabled]);

        scheduler.resync().await.unwrap();

        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_skip_rules_without_parseable_time() {
        let bad = time_rule("Sunrise", "sunrise", true);
        let good = time_rule("Fixed", "06:15", true);
        let scheduler = make_scheduler(vec![bad, good.clone()]);

        scheduler.resync().await.unwrap();

        let jobs = scheduler.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].automation_id, good.id);
    }

    #[tokio::test]
    async fn should_skip_non_time_rule_kinds() {
        let mut link = time_rule("Link", "07:00", true);
        link.kind = RuleKind::DeviceLink;
        let scheduler = make_scheduler(vec![link]);

        scheduler.resync().await.unwrap();

        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_produce_identical_job_set_when_resynced_twice() {
        let rule = time_rule("Stable", "12:00", true);
        let scheduler = make_scheduler(vec![rule]);

        scheduler.resync().await.unwrap();
        let first = scheduler.jobs();
        scheduler.resync().await.unwrap();
        let second = scheduler.jobs();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_drop_job_when_rule_is_deleted() {
        let rule = time_rule("Doomed", "07:00", true);
        let id = rule.id;
        let scheduler = make_scheduler(vec![rule]);

        scheduler.resync().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 1);

        scheduler.rules.remove(id);
        scheduler.resync().await.unwrap();

        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_drop_job_when_rule_is_disabled() {
        let mut rule = time_rule("Flicker", "07:00", true);
        let scheduler = make_scheduler(vec![rule.clone()]);

        scheduler.resync().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 1);

        rule.enabled = false;
        scheduler.rules.put(rule);
        scheduler.resync().await.unwrap();

        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_start_only_once() {
        let scheduler = make_scheduler(vec![time_rule("One", "07:00", true)]);

        scheduler.start().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 1);

        // A rule added later is not picked up by a second start().
        scheduler.rules.put(time_rule("Two", "08:00", true));
        scheduler.start().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 1);

        // But a resync is.
        scheduler.resync().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 2);
    }

    #[tokio::test]
    async fn should_keep_previous_jobs_when_rule_store_read_fails() {
        let scheduler = make_scheduler(vec![time_rule("Kept", "07:00", true)]);
        scheduler.resync().await.unwrap();
        assert_eq!(scheduler.jobs().len(), 1);

        scheduler.rules.fail_reads.store(true, Ordering::SeqCst);
        let result = scheduler.resync().await;

        assert!(matches!(result, Err(HomeError::Storage(_))));
        assert_eq!(scheduler.jobs().len(), 1);
    }

    #[tokio::test]
    async fn should_resync_when_automation_changed_event_arrives() {
        let rule = time_rule("Reactive", "07:00", true);
        let scheduler = Arc::new(make_scheduler(vec![]));
        let bus = InProcessEventBus::new(16);
        let _listener = spawn_resync_listener(Arc::clone(&scheduler), bus.subscribe());

        scheduler.rules.put(rule);
        bus.publish(Event::new(EventType::AutomationChanged, serde_json::json!({})))
            .await
            .unwrap();

        // The listener runs on its own task; poll briefly for the rebuild.
        for _ in 0..50 {
            if !scheduler.jobs().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(scheduler.jobs().len(), 1);
    }

    #[tokio::test]
    async fn should_ignore_unrelated_events() {
        let scheduler = Arc::new(make_scheduler(vec![]));
        let bus = InProcessEventBus::new(16);
        let _listener = spawn_resync_listener(Arc::clone(&scheduler), bus.subscribe());

        scheduler.rules.put(time_rule("Quiet", "07:00", true));
        bus.publish(Event::new(EventType::DeviceStateChanged, serde_json::json!({})))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(scheduler.jobs().is_empty());
    }

    // ── next_occurrence ────────────────────────────────────────────

    #[test]
    fn should_pick_today_when_trigger_time_is_ahead() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 6, 30, 0).unwrap();
        let next = next_occurrence(now, 7, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn should_pick_tomorrow_when_trigger_time_has_passed() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let next = next_occurrence(now, 7, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
    }

    #[test]
    fn should_pick_tomorrow_when_now_is_exactly_the_trigger_time() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap();
        let next = next_occurrence(now, 7, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap());
    }

    #[test]
    fn should_cross_month_boundaries() {
        let now = Local.with_ymd_and_hms(2025, 6, 30, 23, 59, 0).unwrap();
        let next = next_occurrence(now, 0, 0);
        assert_eq!(next, Local.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
    }
}
