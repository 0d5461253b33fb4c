// Immutable transition table, one ordered list per entity kind
// Built once at startup and shared by reference; never mutated afterwards.

use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use super::effects::{GenerateInvoice, ScheduleNotification};
use super::guards::{DueDatePassed, EditorAssigned, NoPhotographerConflict, PositiveAmount, ScheduledDatePassed};
use super::status::{describe, BookingStatus, EditingStatus, EntityKind, InvoiceStatus, Status};
use super::transition::Transition;
use crate::services::NotificationKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Transition {name} has an empty source set")]
    EmptySourceSet { name: &'static str },

    #[error("Transition {name} uses {status:?} which is not a {kind} status")]
    ForeignStatus {
        name: &'static str,
        kind: EntityKind,
        status: Status,
    },

    #[error("Transitions {first} and {second} both match {kind} {from} -> {to}")]
    Ambiguous {
        kind: EntityKind,
        first: &'static str,
        second: &'static str,
        from: String,
        to: Status,
    },
}

#[derive(Debug, Default)]
pub struct TransitionRegistry {
    tables: HashMap<EntityKind, Vec<Transition>>,
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tables: HashMap<EntityKind, Vec<Transition>>,
}

impl RegistryBuilder {
    pub fn transition(mut self, kind: EntityKind, transition: Transition) -> Self {
        self.tables.entry(kind).or_default().push(transition);
        self
    }

    pub fn kind(mut self, kind: EntityKind, transitions: Vec<Transition>) -> Self {
        self.tables.entry(kind).or_default().extend(transitions);
        self
    }

    /// Validate the table and freeze it.
    pub fn build(self) -> Result<TransitionRegistry, RegistryError> {
        for (kind, transitions) in &self.tables {
            check_table(*kind, transitions)?;
        }
        Ok(TransitionRegistry { tables: self.tables })
    }
}

fn check_table(kind: EntityKind, transitions: &[Transition]) -> Result<(), RegistryError> {
    let mut seen: HashMap<(Option<Status>, Status), &'static str> = HashMap::new();

    for transition in transitions {
        if transition.from.is_empty() {
            return Err(RegistryError::EmptySourceSet { name: transition.name });
        }
        let foreign = std::iter::once(transition.to)
            .chain(transition.from.statuses.iter().copied())
            .find(|status| status.kind() != kind);
        if let Some(status) = foreign {
            return Err(RegistryError::ForeignStatus {
                name: transition.name,
                kind,
                status,
            });
        }

        for from in transition.from.members() {
            if let Some(first) = seen.insert((from, transition.to), transition.name) {
                return Err(RegistryError::Ambiguous {
                    kind,
                    first,
                    second: transition.name,
                    from: describe(from).to_string(),
                    to: transition.to,
                });
            }
        }
    }
    Ok(())
}

impl TransitionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Ordered transitions for a kind; empty when the kind has no table.
    pub fn transitions_for(&self, kind: EntityKind) -> &[Transition] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Same as `transitions_for`, keyed by the kind tag. Unknown tags have no transitions.
    pub fn transitions_for_tag(&self, tag: &str) -> &[Transition] {
        EntityKind::from_str(tag)
            .map(|kind| self.transitions_for(kind))
            .unwrap_or(&[])
    }

    /// First transition in table order leading from `current` to `target`.
    pub fn find(&self, kind: EntityKind, current: Option<Status>, target: Status) -> Option<&Transition> {
        self.transitions_for(kind)
            .iter()
            .find(|t| t.matches(current, target))
    }

    /// Every target reachable from `current`, in table order, duplicates kept.
    pub fn targets_from(&self, kind: EntityKind, current: Option<Status>) -> Vec<Status> {
        self.transitions_for(kind)
            .iter()
            .filter(|t| t.from.contains(current))
            .map(|t| t.to)
            .collect()
    }

    /// The studio's booking, invoice and editing workflows.
    pub fn studio() -> Self {
        let tables = HashMap::from([
            (EntityKind::Booking, booking_transitions()),
            (EntityKind::Invoice, invoice_transitions()),
            (EntityKind::EditingJob, editing_transitions()),
        ]);
        Self { tables }
    }
}

fn booking_transitions() -> Vec<Transition> {
    use BookingStatus::*;
    vec![
        Transition::initial("open_booking", Pending),
        Transition::new("confirm_booking", [Pending], Confirmed)
            .guarded_by(NoPhotographerConflict)
            .then(GenerateInvoice)
            .then(ScheduleNotification(NotificationKind::BookingConfirmed)),
        Transition::new("complete_booking", [Confirmed], Completed)
            .guarded_by(ScheduledDatePassed)
            .then(ScheduleNotification(NotificationKind::BookingCompleted)),
        Transition::new("cancel_booking", [Pending, Confirmed], Cancelled)
            .then(ScheduleNotification(NotificationKind::BookingCancelled)),
    ]
}

fn invoice_transitions() -> Vec<Transition> {
    use InvoiceStatus::*;
    vec![
        Transition::initial("draft_invoice", Draft),
        Transition::new("send_invoice", [Draft], Sent)
            .guarded_by(PositiveAmount)
            .then(ScheduleNotification(NotificationKind::InvoiceIssued)),
        Transition::new("mark_overdue", [Sent], Overdue)
            .guarded_by(DueDatePassed)
            .then(ScheduleNotification(NotificationKind::InvoiceOverdue)),
        Transition::new("record_payment", [Sent, Overdue], Paid)
            .then(ScheduleNotification(NotificationKind::PaymentReceived)),
    ]
}

fn editing_transitions() -> Vec<Transition> {
    use EditingStatus::*;
    vec![
        Transition::initial("queue_edit", Queue),
        Transition::new("start_edit", [Queue, RevisionsNeeded], InProgress).guarded_by(EditorAssigned),
        Transition::new("submit_for_review", [InProgress], ClientReview)
            .then(ScheduleNotification(NotificationKind::ReviewReady)),
        Transition::new("request_revisions", [ClientReview], RevisionsNeeded),
        Transition::new("deliver_edit", [ClientReview, RevisionsNeeded], Completed)
            .then(ScheduleNotification(NotificationKind::DeliveryReady)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(s: BookingStatus) -> Option<Status> {
        Some(s.into())
    }

    #[test]
    fn studio_table_passes_its_own_checks() {
        let registry = TransitionRegistry::studio();
        for kind in EntityKind::ALL {
            check_table(kind, registry.transitions_for(kind)).unwrap();
        }
    }

    #[test]
    fn pending_booking_can_confirm_or_cancel() {
        let registry = TransitionRegistry::studio();
        assert_eq!(
            registry.targets_from(EntityKind::Booking, booking(BookingStatus::Pending)),
            vec![Status::from(BookingStatus::Confirmed), BookingStatus::Cancelled.into()]
        );
    }

    #[test]
    fn unknown_tag_has_no_transitions() {
        let registry = TransitionRegistry::studio();
        assert!(registry.transitions_for_tag("gallery").is_empty());
        assert_eq!(registry.transitions_for_tag("editing").len(), 5);
    }

    #[test]
    fn first_match_wins() {
        let registry = TransitionRegistry::studio();
        let found = registry
            .find(
                EntityKind::EditingJob,
                Some(EditingStatus::RevisionsNeeded.into()),
                EditingStatus::Completed.into(),
            )
            .unwrap();
        assert_eq!(found.name, "deliver_edit");
    }

    #[test]
    fn ambiguous_pair_is_rejected_at_build() {
        let err = TransitionRegistry::builder()
            .transition(
                EntityKind::Booking,
                Transition::new("confirm", [BookingStatus::Pending], BookingStatus::Confirmed),
            )
            .transition(
                EntityKind::Booking,
                Transition::new(
                    "confirm_again",
                    [BookingStatus::Cancelled, BookingStatus::Pending],
                    BookingStatus::Confirmed,
                ),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Ambiguous {
                kind: EntityKind::Booking,
                first: "confirm",
                second: "confirm_again",
                from: "Pending".to_string(),
                to: BookingStatus::Confirmed.into(),
            }
        );
    }

    #[test]
    fn foreign_status_is_rejected_at_build() {
        let err = TransitionRegistry::builder()
            .transition(
                EntityKind::Invoice,
                Transition::new("odd", [InvoiceStatus::Draft], BookingStatus::Confirmed),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::ForeignStatus { name: "odd", .. }));
    }

    #[test]
    fn empty_source_set_is_rejected_at_build() {
        let err = TransitionRegistry::builder()
            .transition(
                EntityKind::Invoice,
                Transition::new("nowhere", Vec::<InvoiceStatus>::new(), InvoiceStatus::Paid),
            )
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptySourceSet { name: "nowhere" });
    }
}
