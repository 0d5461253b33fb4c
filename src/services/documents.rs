use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{DocumentGenerator, EntityStore, ServiceError};
use crate::workflows::entity::{Booking, Invoice};
use crate::workflows::status::InvoiceStatus;

/// Drafts the invoice for a confirmed booking straight into the entity store.
pub struct DraftInvoiceGenerator {
    store: Arc<dyn EntityStore>,
    due_days: i64,
}

impl DraftInvoiceGenerator {
    pub fn new(store: Arc<dyn EntityStore>, due_days: i64) -> Self {
        Self { store, due_days }
    }

    fn draft_for(&self, booking: &Booking) -> Result<Invoice, ServiceError> {
        let due = Duration::try_days(self.due_days)
            .and_then(|days| booking.scheduled_at.checked_add_signed(days))
            .ok_or_else(|| {
                ServiceError::Rejected(format!(
                    "due date for booking {} is out of range ({} days after {})",
                    booking.id, self.due_days, booking.scheduled_at
                ))
            })?;

        Ok(Invoice {
            id: format!("inv-{}", Uuid::new_v4().simple()),
            client_id: booking.client_id.clone(),
            booking_id: Some(booking.id.clone()),
            amount_cents: booking.total_cents,
            due_date: due.date_naive(),
            status: Some(InvoiceStatus::Draft),
        })
    }
}

#[async_trait]
impl DocumentGenerator for DraftInvoiceGenerator {
    async fn generate_invoice(&self, booking: &Booking) -> Result<String, ServiceError> {
        if booking.total_cents <= 0 {
            return Err(ServiceError::Rejected(format!(
                "booking {} has no billable total",
                booking.id
            )));
        }

        let invoice = self.draft_for(booking)?;
        let invoice_id = invoice.id.clone();
        self.store.insert(invoice.into()).await?;

        info!(
            booking_id = %booking.id,
            invoice_id = %invoice_id,
            amount_cents = booking.total_cents,
            "Draft invoice generated"
        );
        Ok(invoice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;
    use crate::workflows::status::EntityKind;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn booking(total_cents: i64) -> Booking {
        Booking {
            id: "bk-7".to_string(),
            client_id: "cl-3".to_string(),
            photographer_id: None,
            scheduled_at: Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
            total_cents,
            status: None,
        }
    }

    #[tokio::test]
    async fn drafts_invoice_due_after_the_shoot() {
        let store = Arc::new(MemoryStore::default());
        let generator = DraftInvoiceGenerator::new(store.clone(), 14);

        let id = generator.generate_invoice(&booking(90_000)).await.unwrap();
        let stored = store.get(EntityKind::Invoice, &id).await.unwrap();
        let invoice = stored.as_invoice().unwrap();

        assert_eq!(invoice.status, Some(InvoiceStatus::Draft));
        assert_eq!(invoice.amount_cents, 90_000);
        assert_eq!(invoice.booking_id.as_deref(), Some("bk-7"));
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 3, 24).unwrap());
    }

    #[tokio::test]
    async fn refuses_zero_total() {
        let store = Arc::new(MemoryStore::default());
        let generator = DraftInvoiceGenerator::new(store.clone(), 14);

        let err = generator.generate_invoice(&booking(0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));
        assert!(store.entities_of(EntityKind::Invoice).await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_due_date_is_rejected() {
        let store = Arc::new(MemoryStore::default());
        let generator = DraftInvoiceGenerator::new(store.clone(), 14);
        let late = Booking {
            scheduled_at: chrono::DateTime::<Utc>::MAX_UTC,
            ..booking(90_000)
        };

        let err = generator.generate_invoice(&late).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));

        let generator = DraftInvoiceGenerator::new(store.clone(), i64::MAX);
        assert!(generator.generate_invoice(&booking(90_000)).await.is_err());
        assert!(store.entities_of(EntityKind::Invoice).await.is_empty());
    }
}
