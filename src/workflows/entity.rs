// Entity snapshots borrowed by the engine for the duration of one transition

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::status::{BookingStatus, EditingStatus, EntityKind, InvoiceStatus, Status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub photographer_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub total_cents: i64,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingJob {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub editor_id: Option<String>,
    #[serde(default)]
    pub status: Option<EditingStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Booking(Booking),
    Invoice(Invoice),
    #[serde(rename = "editing")]
    EditingJob(EditingJob),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Booking(b) => &b.id,
            Entity::Invoice(i) => &i.id,
            Entity::EditingJob(e) => &e.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Booking(_) => EntityKind::Booking,
            Entity::Invoice(_) => EntityKind::Invoice,
            Entity::EditingJob(_) => EntityKind::EditingJob,
        }
    }

    pub fn status(&self) -> Option<Status> {
        match self {
            Entity::Booking(b) => b.status.map(Status::Booking),
            Entity::Invoice(i) => i.status.map(Status::Invoice),
            Entity::EditingJob(e) => e.status.map(Status::EditingJob),
        }
    }

    /// Overwrite the in-memory status. A status of another kind is ignored and returns false.
    pub fn set_status(&mut self, status: Status) -> bool {
        match (self, status) {
            (Entity::Booking(b), Status::Booking(s)) => b.status = Some(s),
            (Entity::Invoice(i), Status::Invoice(s)) => i.status = Some(s),
            (Entity::EditingJob(e), Status::EditingJob(s)) => e.status = Some(s),
            _ => return false,
        }
        true
    }

    pub fn client_id(&self) -> &str {
        match self {
            Entity::Booking(b) => &b.client_id,
            Entity::Invoice(i) => &i.client_id,
            Entity::EditingJob(e) => &e.client_id,
        }
    }

    pub fn as_booking(&self) -> Option<&Booking> {
        match self {
            Entity::Booking(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_invoice(&self) -> Option<&Invoice> {
        match self {
            Entity::Invoice(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_editing_job(&self) -> Option<&EditingJob> {
        match self {
            Entity::EditingJob(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Booking> for Entity {
    fn from(b: Booking) -> Self {
        Entity::Booking(b)
    }
}

impl From<Invoice> for Entity {
    fn from(i: Invoice) -> Self {
        Entity::Invoice(i)
    }
}

impl From<EditingJob> for Entity {
    fn from(e: EditingJob) -> Self {
        Entity::EditingJob(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking() -> Entity {
        Booking {
            id: "bk-1".to_string(),
            client_id: "cl-1".to_string(),
            photographer_id: Some("ph-1".to_string()),
            scheduled_at: Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap(),
            total_cents: 120_000,
            status: Some(BookingStatus::Pending),
        }
        .into()
    }

    #[test]
    fn set_status_rejects_foreign_kind() {
        let mut entity = booking();
        assert!(!entity.set_status(InvoiceStatus::Paid.into()));
        assert_eq!(entity.status(), Some(BookingStatus::Pending.into()));

        assert!(entity.set_status(BookingStatus::Confirmed.into()));
        assert_eq!(entity.status(), Some(BookingStatus::Confirmed.into()));
    }

    #[test]
    fn entity_json_carries_kind_tag() {
        let json = serde_json::to_value(booking()).unwrap();
        assert_eq!(json["kind"], "booking");
        assert_eq!(json["status"], "Pending");

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), EntityKind::Booking);
        assert_eq!(back.id(), "bk-1");
    }

    #[test]
    fn missing_status_deserializes_as_none() {
        let job: Entity = serde_json::from_str(
            r#"{"kind":"editing","id":"ed-1","client_id":"cl-1"}"#,
        )
        .unwrap();
        assert_eq!(job.status(), None);
        assert_eq!(job.kind(), EntityKind::EditingJob);
    }
}
