// Transition records: source set, target, optional guard, ordered side effects

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use super::entity::Entity;
use super::status::Status;
use crate::config::WorkflowSettings;
use crate::services::{ServiceError, Services};

/// Outcome of a guard. A denial carries the specific reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny { reason: String },
}

impl Verdict {
    pub fn deny(reason: impl Into<String>) -> Self {
        Verdict::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Everything a guard or side effect may look at during one transition.
pub struct TransitionContext<'a> {
    pub entity: &'a Entity,
    pub from: Option<Status>,
    pub to: Status,
    pub note: Option<&'a str>,
    pub now: DateTime<Utc>,
    pub services: &'a Services,
    pub settings: &'a WorkflowSettings,
}

/// Validation predicate evaluated before commit.
#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict;
}

/// Action run after the status is committed. Failures never undo the commit.
#[async_trait]
pub trait SideEffect: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &TransitionContext<'_>) -> Result<(), ServiceError>;
}

/// Statuses an edge may be taken from. `unset` admits entities with no status yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub statuses: Vec<Status>,
    pub unset: bool,
}

impl SourceSet {
    pub fn contains(&self, current: Option<Status>) -> bool {
        match current {
            Some(status) => self.statuses.contains(&status),
            None => self.unset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && !self.unset
    }

    /// Every source value, with `None` standing for the unset marker.
    pub fn members(&self) -> Vec<Option<Status>> {
        let mut members: Vec<Option<Status>> = self.statuses.iter().copied().map(Some).collect();
        if self.unset {
            members.push(None);
        }
        members
    }
}

#[derive(Clone)]
pub struct Transition {
    pub name: &'static str,
    pub from: SourceSet,
    pub to: Status,
    pub guard: Option<Arc<dyn Guard>>,
    pub effects: Vec<Arc<dyn SideEffect>>,
}

impl Transition {
    pub fn new<I, S>(name: &'static str, from: I, to: impl Into<Status>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Status>,
    {
        Self {
            name,
            from: SourceSet {
                statuses: from.into_iter().map(Into::into).collect(),
                unset: false,
            },
            to: to.into(),
            guard: None,
            effects: Vec::new(),
        }
    }

    /// Edge taken by entities that have no status yet.
    pub fn initial(name: &'static str, to: impl Into<Status>) -> Self {
        Self {
            name,
            from: SourceSet {
                statuses: Vec::new(),
                unset: true,
            },
            to: to.into(),
            guard: None,
            effects: Vec::new(),
        }
    }

    pub fn guarded_by(mut self, guard: impl Guard + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn then(mut self, effect: impl SideEffect + 'static) -> Self {
        self.effects.push(Arc::new(effect));
        self
    }

    pub fn matches(&self, current: Option<Status>, target: Status) -> bool {
        self.to == target && self.from.contains(current)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guard", &self.guard.as_ref().map(|g| g.name()))
            .field("effects", &self.effects.iter().map(|e| e.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::status::{BookingStatus, EditingStatus};

    #[test]
    fn unset_status_matches_only_initial_edges() {
        let open = Transition::initial("open_booking", BookingStatus::Pending);
        let confirm = Transition::new("confirm_booking", [BookingStatus::Pending], BookingStatus::Confirmed);

        assert!(open.matches(None, BookingStatus::Pending.into()));
        assert!(!confirm.matches(None, BookingStatus::Confirmed.into()));
        assert!(confirm.matches(Some(BookingStatus::Pending.into()), BookingStatus::Confirmed.into()));
    }

    #[test]
    fn source_set_is_kind_strict() {
        let deliver = Transition::new(
            "deliver_edit",
            [EditingStatus::ClientReview, EditingStatus::RevisionsNeeded],
            EditingStatus::Completed,
        );
        assert!(deliver.matches(Some(EditingStatus::RevisionsNeeded.into()), EditingStatus::Completed.into()));
        assert!(!deliver.matches(Some(EditingStatus::RevisionsNeeded.into()), BookingStatus::Completed.into()));
    }

    #[test]
    fn members_include_unset_marker() {
        let open = Transition::initial("queue_edit", EditingStatus::Queue);
        assert_eq!(open.from.members(), vec![None]);
        assert!(!open.from.is_empty());
        let broken = Transition::new("broken", Vec::<BookingStatus>::new(), BookingStatus::Pending);
        assert!(broken.from.is_empty());
    }
}
