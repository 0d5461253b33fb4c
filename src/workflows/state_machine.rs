// Workflow engine: lookup -> guard -> atomic commit -> best-effort side effects
// execute_transition never returns an error; every failure is folded into TransitionResult.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use super::entity::Entity;
use super::registry::TransitionRegistry;
use super::status::{describe, EntityKind, Status};
use super::transition::{Transition, TransitionContext, Verdict};
use crate::config::{CommitPolicy, WorkflowSettings};
use crate::observability::{OperationTimer, WorkflowMetrics};
use crate::services::{CommitRequest, Services, TransitionRecord};
use crate::telemetry::{create_transition_span, generate_correlation_id};

pub const VALIDATION_FAILED: &str = "Validation failed for this transition";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    IllegalTransition,
    ValidationDeclined,
    CommitFailed,
    SideEffectFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Specific reason a guard declined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The stored status is now the target, even if `success` is false.
    pub status_committed: bool,
    pub side_effects_completed: bool,
}

impl TransitionResult {
    fn completed() -> Self {
        Self {
            success: true,
            error: None,
            failure: None,
            reason: None,
            status_committed: true,
            side_effects_completed: true,
        }
    }

    fn rejected(failure: FailureKind, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            failure: Some(failure),
            reason: None,
            status_committed: false,
            side_effects_completed: false,
        }
    }

    fn illegal(current: Option<Status>, target: Status) -> Self {
        Self::rejected(
            FailureKind::IllegalTransition,
            format!("Invalid transition from {} to {}", describe(current), target),
        )
    }

    fn wrong_kind(entity: &Entity, kind: EntityKind) -> Self {
        Self::rejected(
            FailureKind::IllegalTransition,
            format!("{} {} is not a {}", entity.kind(), entity.id(), kind),
        )
    }

    fn declined(reason: String) -> Self {
        Self {
            reason: Some(reason),
            ..Self::rejected(FailureKind::ValidationDeclined, VALIDATION_FAILED.to_string())
        }
    }

    fn side_effects_failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            failure: Some(FailureKind::SideEffectFailed),
            reason: None,
            status_committed: true,
            side_effects_completed: false,
        }
    }
}

#[derive(Debug)]
pub struct WorkflowEngine {
    registry: Arc<TransitionRegistry>,
    services: Services,
    settings: WorkflowSettings,
    metrics: Arc<WorkflowMetrics>,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<TransitionRegistry>, services: Services, settings: WorkflowSettings) -> Self {
        Self {
            registry,
            services,
            settings,
            metrics: Arc::new(WorkflowMetrics::new()),
        }
    }

    pub fn registry(&self) -> &TransitionRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &WorkflowMetrics {
        &self.metrics
    }

    /// Move `entity` to `target`. The in-memory status is updated only after a successful commit.
    pub async fn execute_transition(
        &self,
        kind: EntityKind,
        entity: &mut Entity,
        target: Status,
        note: Option<&str>,
    ) -> TransitionResult {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(kind, entity.id(), target, &correlation_id);
        let timer = OperationTimer::new("execute_transition");
        let result = self
            .run_transition(kind, entity, target, note, correlation_id)
            .instrument(span)
            .await;
        self.metrics.record_duration(timer.finish());
        result
    }

    async fn run_transition(
        &self,
        kind: EntityKind,
        entity: &mut Entity,
        target: Status,
        note: Option<&str>,
        correlation_id: String,
    ) -> TransitionResult {
        self.metrics.record_attempt();
        let current = entity.status();

        // The commit is keyed by (kind, id), so a mismatched entity would write to another record
        if entity.kind() != kind {
            self.metrics.record_illegal();
            warn!(entity_kind = %entity.kind(), "Entity does not match the requested kind");
            return TransitionResult::wrong_kind(entity, kind);
        }

        let Some(transition) = self.registry.find(kind, current, target) else {
            self.metrics.record_illegal();
            warn!(from = describe(current), "No transition matches");
            return TransitionResult::illegal(current, target);
        };

        let now = self.services.clock.now();

        if let Some(guard) = &transition.guard {
            let ctx = self.context(entity, current, target, note, now);
            if let Verdict::Deny { reason } = guard.check(&ctx).await {
                self.metrics.record_validation_failure();
                info!(transition = transition.name, guard = guard.name(), reason = %reason, "Validation declined");
                return TransitionResult::declined(reason);
            }
        }

        let request = CommitRequest {
            kind,
            id: entity.id().to_string(),
            expected: match self.settings.commit_policy {
                CommitPolicy::CompareAndSwap => Some(current),
                CommitPolicy::LastWriteWins => None,
            },
            new_status: target,
            record: TransitionRecord {
                entity_kind: kind,
                entity_id: entity.id().to_string(),
                transition: transition.name.to_string(),
                from: current,
                to: target,
                note: note.map(str::to_string),
                correlation_id,
                committed_at: now,
            },
        };

        if let Err(e) = self.services.store.commit_status(request).await {
            self.metrics.record_commit_failure();
            error!(transition = transition.name, error = %e, "Status commit failed");
            return TransitionResult::rejected(FailureKind::CommitFailed, e.to_string());
        }

        if !entity.set_status(target) {
            error!(to = %target, "Committed status does not fit the entity");
        }
        self.metrics.record_commit();
        info!(transition = transition.name, from = describe(current), to = %target, "Status committed");

        match self.fire_effects(transition, entity, current, target, note, now).await {
            Ok(()) => TransitionResult::completed(),
            Err(message) => TransitionResult::side_effects_failed(message),
        }
    }

    /// Run every effect in order; failures are logged and collected, never rolled back.
    async fn fire_effects(
        &self,
        transition: &Transition,
        entity: &Entity,
        from: Option<Status>,
        target: Status,
        note: Option<&str>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), String> {
        let ctx = self.context(entity, from, target, note, now);
        let mut failures = Vec::new();

        for effect in &transition.effects {
            if let Err(e) = effect.run(&ctx).await {
                self.metrics.record_side_effect_failure();
                error!(transition = transition.name, effect = effect.name(), error = %e, "Side effect failed");
                failures.push(format!("{}: {}", effect.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }

    fn context<'a>(
        &'a self,
        entity: &'a Entity,
        from: Option<Status>,
        to: Status,
        note: Option<&'a str>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> TransitionContext<'a> {
        TransitionContext {
            entity,
            from,
            to,
            note,
            now,
            services: &self.services,
            settings: &self.settings,
        }
    }

    /// Targets reachable from `current`, table order, duplicates kept.
    pub fn valid_transitions(&self, kind: EntityKind, current: Option<Status>) -> Vec<Status> {
        self.registry.targets_from(kind, current)
    }

    pub fn is_valid_transition(&self, kind: EntityKind, from: Option<Status>, to: Status) -> bool {
        self.valid_transitions(kind, from).contains(&to)
    }
}
