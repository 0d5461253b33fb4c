// Side effects fired after a committed status change

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

use super::entity::Entity;
use super::transition::{SideEffect, TransitionContext};
use crate::services::{Notification, NotificationKind, ServiceError};

/// Generates the invoice document for a confirmed booking.
pub struct GenerateInvoice;

#[async_trait]
impl SideEffect for GenerateInvoice {
    fn name(&self) -> &'static str {
        "generate_invoice"
    }

    async fn run(&self, ctx: &TransitionContext<'_>) -> Result<(), ServiceError> {
        let booking = ctx
            .entity
            .as_booking()
            .ok_or_else(|| ServiceError::Rejected("invoice generation needs a booking".to_string()))?;
        let invoice_id = ctx.services.documents.generate_invoice(booking).await?;
        info!(booking_id = %booking.id, invoice_id = %invoice_id, "Invoice generated for booking");
        Ok(())
    }
}

/// Schedules one client notification for the entity.
pub struct ScheduleNotification(pub NotificationKind);

impl ScheduleNotification {
    fn build(&self, ctx: &TransitionContext<'_>) -> Notification {
        let remind_at = match (self.0, ctx.entity) {
            // No reminder when the date arithmetic leaves chrono's range
            (NotificationKind::InvoiceIssued, Entity::Invoice(invoice)) => {
                Duration::try_days(ctx.settings.payment_reminder_lead_days)
                    .and_then(|lead| invoice.due_date.checked_sub_signed(lead))
                    .and_then(|day| day.and_hms_opt(9, 0, 0))
                    .map(|reminder| reminder.and_utc())
                    .filter(|reminder| *reminder > ctx.now)
            }
            _ => None,
        };

        Notification {
            kind: self.0,
            entity_kind: ctx.entity.kind(),
            entity_id: ctx.entity.id().to_string(),
            recipient: ctx.entity.client_id().to_string(),
            send_at: ctx.now,
            remind_at,
        }
    }
}

#[async_trait]
impl SideEffect for ScheduleNotification {
    fn name(&self) -> &'static str {
        match self.0 {
            NotificationKind::BookingConfirmed => "notify_booking_confirmed",
            NotificationKind::BookingCompleted => "notify_booking_completed",
            NotificationKind::BookingCancelled => "notify_booking_cancelled",
            NotificationKind::InvoiceIssued => "notify_invoice_issued",
            NotificationKind::InvoiceOverdue => "notify_invoice_overdue",
            NotificationKind::PaymentReceived => "notify_payment_received",
            NotificationKind::ReviewReady => "notify_review_ready",
            NotificationKind::DeliveryReady => "notify_delivery_ready",
        }
    }

    async fn run(&self, ctx: &TransitionContext<'_>) -> Result<(), ServiceError> {
        ctx.services.notifier.schedule(self.build(ctx)).await
    }
}
