// Validation predicates used by the studio transition table

use async_trait::async_trait;
use tracing::warn;

use super::transition::{Guard, TransitionContext, Verdict};

/// Booking may only be confirmed if its photographer has no other active booking in the conflict window.
pub struct NoPhotographerConflict;

#[async_trait]
impl Guard for NoPhotographerConflict {
    fn name(&self) -> &'static str {
        "no_photographer_conflict"
    }

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict {
        let Some(booking) = ctx.entity.as_booking() else {
            return Verdict::deny("expected a booking");
        };
        let Some(photographer_id) = booking.photographer_id.as_deref() else {
            return Verdict::Allow;
        };

        match ctx
            .services
            .conflicts
            .find_conflicts(photographer_id, booking.scheduled_at)
            .await
        {
            Ok(found) => {
                let clashes: Vec<String> = found
                    .into_iter()
                    .filter(|other| other.id != booking.id)
                    .map(|other| other.id)
                    .collect();
                if clashes.is_empty() {
                    Verdict::Allow
                } else {
                    Verdict::deny(format!(
                        "photographer {} is already booked ({})",
                        photographer_id,
                        clashes.join(", ")
                    ))
                }
            }
            Err(e) => {
                warn!(booking_id = %booking.id, error = %e, "Conflict check failed");
                Verdict::deny(format!("conflict check failed: {}", e))
            }
        }
    }
}

/// Booking can only complete once its scheduled date has passed.
pub struct ScheduledDatePassed;

#[async_trait]
impl Guard for ScheduledDatePassed {
    fn name(&self) -> &'static str {
        "scheduled_date_passed"
    }

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict {
        match ctx.entity.as_booking() {
            Some(booking) if booking.scheduled_at <= ctx.now => Verdict::Allow,
            Some(booking) => Verdict::deny(format!(
                "booking date {} has not passed",
                booking.scheduled_at.date_naive()
            )),
            None => Verdict::deny("expected a booking"),
        }
    }
}

pub struct PositiveAmount;

#[async_trait]
impl Guard for PositiveAmount {
    fn name(&self) -> &'static str {
        "positive_amount"
    }

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict {
        match ctx.entity.as_invoice() {
            Some(invoice) if invoice.amount_cents > 0 => Verdict::Allow,
            Some(_) => Verdict::deny("invoice amount must be positive"),
            None => Verdict::deny("expected an invoice"),
        }
    }
}

/// Invoice becomes overdue only after its due date.
pub struct DueDatePassed;

#[async_trait]
impl Guard for DueDatePassed {
    fn name(&self) -> &'static str {
        "due_date_passed"
    }

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict {
        match ctx.entity.as_invoice() {
            Some(invoice) if ctx.now.date_naive() > invoice.due_date => Verdict::Allow,
            Some(invoice) => Verdict::deny(format!("invoice is not due until {}", invoice.due_date)),
            None => Verdict::deny("expected an invoice"),
        }
    }
}

pub struct EditorAssigned;

#[async_trait]
impl Guard for EditorAssigned {
    fn name(&self) -> &'static str {
        "editor_assigned"
    }

    async fn check(&self, ctx: &TransitionContext<'_>) -> Verdict {
        match ctx.entity.as_editing_job() {
            Some(job) if job.editor_id.as_deref().is_some_and(|id| !id.is_empty()) => Verdict::Allow,
            Some(_) => Verdict::deny("no editor assigned"),
            None => Verdict::deny("expected an editing job"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowSettings;
    use crate::services::{
        FixedClock, MemoryStore, MockConflictChecker, Services, StoreError,
    };
    use crate::workflows::entity::{Booking, EditingJob, Entity, Invoice};
    use crate::workflows::status::{BookingStatus, EditingStatus, InvoiceStatus, Status};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, day, 12, 0, 0).unwrap()
    }

    fn booking(id: &str, day: u32) -> Booking {
        Booking {
            id: id.to_string(),
            client_id: "cl-1".to_string(),
            photographer_id: Some("ph-1".to_string()),
            scheduled_at: at(day),
            total_cents: 10_000,
            status: Some(BookingStatus::Pending),
        }
    }

    fn services(conflicts: MockConflictChecker) -> Services {
        let store = Arc::new(MemoryStore::default());
        let mut services = Services::in_memory(store, 14).with_clock(Arc::new(FixedClock(at(10))));
        services.conflicts = Arc::new(conflicts);
        services
    }

    async fn verdict(guard: &dyn Guard, entity: &Entity, services: &Services, to: Status) -> Verdict {
        let settings = WorkflowSettings::default();
        let ctx = TransitionContext {
            entity,
            from: entity.status(),
            to,
            note: None,
            now: at(10),
            services,
            settings: &settings,
        };
        guard.check(&ctx).await
    }

    #[tokio::test]
    async fn conflict_guard_ignores_the_booking_itself() {
        let mut checker = MockConflictChecker::new();
        checker
            .expect_find_conflicts()
            .times(1)
            .returning(|_, _| Ok(vec![booking("bk-1", 20)]));
        let services = services(checker);

        let entity: Entity = booking("bk-1", 20).into();
        let result = verdict(&NoPhotographerConflict, &entity, &services, BookingStatus::Confirmed.into()).await;
        assert_eq!(result, Verdict::Allow);
    }

    #[tokio::test]
    async fn conflict_guard_denies_with_clashing_ids() {
        let mut checker = MockConflictChecker::new();
        checker
            .expect_find_conflicts()
            .returning(|_, _| Ok(vec![booking("bk-2", 20)]));
        let services = services(checker);

        let entity: Entity = booking("bk-1", 20).into();
        let result = verdict(&NoPhotographerConflict, &entity, &services, BookingStatus::Confirmed.into()).await;
        assert_eq!(result, Verdict::deny("photographer ph-1 is already booked (bk-2)"));
    }

    #[tokio::test]
    async fn conflict_guard_denies_when_lookup_fails() {
        let mut checker = MockConflictChecker::new();
        checker
            .expect_find_conflicts()
            .returning(|_, _| Err(StoreError::Backend("offline".to_string())));
        let services = services(checker);

        let entity: Entity = booking("bk-1", 20).into();
        let result = verdict(&NoPhotographerConflict, &entity, &services, BookingStatus::Confirmed.into()).await;
        assert!(!result.is_allowed());
    }

    #[tokio::test]
    async fn unassigned_booking_skips_conflict_lookup() {
        let mut checker = MockConflictChecker::new();
        checker.expect_find_conflicts().times(0);
        let services = services(checker);

        let mut unassigned = booking("bk-1", 20);
        unassigned.photographer_id = None;
        let entity: Entity = unassigned.into();
        let result = verdict(&NoPhotographerConflict, &entity, &services, BookingStatus::Confirmed.into()).await;
        assert_eq!(result, Verdict::Allow);
    }

    #[tokio::test]
    async fn completion_waits_for_the_shoot_date() {
        let services = services(MockConflictChecker::new());
        let future: Entity = booking("bk-1", 20).into();
        let past: Entity = booking("bk-2", 5).into();

        let to: Status = BookingStatus::Completed.into();
        assert!(!verdict(&ScheduledDatePassed, &future, &services, to).await.is_allowed());
        assert!(verdict(&ScheduledDatePassed, &past, &services, to).await.is_allowed());
    }

    #[tokio::test]
    async fn invoice_guards_check_amount_and_due_date() {
        let services = services(MockConflictChecker::new());
        let invoice = Invoice {
            id: "inv-1".to_string(),
            client_id: "cl-1".to_string(),
            booking_id: None,
            amount_cents: 0,
            due_date: NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
            status: Some(InvoiceStatus::Draft),
        };
        let entity: Entity = invoice.clone().into();
        assert!(!verdict(&PositiveAmount, &entity, &services, InvoiceStatus::Sent.into()).await.is_allowed());
        assert!(!verdict(&DueDatePassed, &entity, &services, InvoiceStatus::Overdue.into()).await.is_allowed());

        let overdue: Entity = Invoice {
            amount_cents: 500,
            due_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            ..invoice
        }
        .into();
        assert!(verdict(&PositiveAmount, &overdue, &services, InvoiceStatus::Sent.into()).await.is_allowed());
        assert!(verdict(&DueDatePassed, &overdue, &services, InvoiceStatus::Overdue.into()).await.is_allowed());
    }

    #[tokio::test]
    async fn editing_needs_an_editor() {
        let services = services(MockConflictChecker::new());
        let job = EditingJob {
            id: "ed-1".to_string(),
            client_id: "cl-1".to_string(),
            booking_id: None,
            editor_id: None,
            status: Some(EditingStatus::Queue),
        };
        let unassigned: Entity = job.clone().into();
        let assigned: Entity = EditingJob {
            editor_id: Some("ed-anna".to_string()),
            ..job
        }
        .into();

        let to: Status = EditingStatus::InProgress.into();
        assert_eq!(
            verdict(&EditorAssigned, &unassigned, &services, to).await,
            Verdict::deny("no editor assigned")
        );
        assert!(verdict(&EditorAssigned, &assigned, &services, to).await.is_allowed());
    }
}
