// Entity kinds and their status enumerations
// A status is always tagged with its kind; cross-kind comparison is impossible by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusParseError {
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),
    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: EntityKind, value: String },
}

/// The three entity kinds governed by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Booking,
    Invoice,
    #[serde(rename = "editing")]
    EditingJob,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Booking, EntityKind::Invoice, EntityKind::EditingJob];

    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Booking => "booking",
            EntityKind::Invoice => "invoice",
            EntityKind::EditingJob => "editing",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EntityKind {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "booking" => Ok(EntityKind::Booking),
            "invoice" => Ok(EntityKind::Invoice),
            "editing" | "editing_job" => Ok(EntityKind::EditingJob),
            _ => Err(StatusParseError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditingStatus {
    Queue,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Client Review")]
    ClientReview,
    #[serde(rename = "Revisions Needed")]
    RevisionsNeeded,
    Completed,
}

/// A status value paired with the entity kind it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum Status {
    Booking(BookingStatus),
    Invoice(InvoiceStatus),
    #[serde(rename = "editing")]
    EditingJob(EditingStatus),
}

impl Status {
    pub fn kind(&self) -> EntityKind {
        match self {
            Status::Booking(_) => EntityKind::Booking,
            Status::Invoice(_) => EntityKind::Invoice,
            Status::EditingJob(_) => EntityKind::EditingJob,
        }
    }

    /// Human label, also used verbatim in transition error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Booking(s) => match s {
                BookingStatus::Pending => "Pending",
                BookingStatus::Confirmed => "Confirmed",
                BookingStatus::Completed => "Completed",
                BookingStatus::Cancelled => "Cancelled",
            },
            Status::Invoice(s) => match s {
                InvoiceStatus::Draft => "Draft",
                InvoiceStatus::Sent => "Sent",
                InvoiceStatus::Paid => "Paid",
                InvoiceStatus::Overdue => "Overdue",
            },
            Status::EditingJob(s) => match s {
                EditingStatus::Queue => "Queue",
                EditingStatus::InProgress => "In Progress",
                EditingStatus::ClientReview => "Client Review",
                EditingStatus::RevisionsNeeded => "Revisions Needed",
                EditingStatus::Completed => "Completed",
            },
        }
    }

    /// Parse a status for `kind` from its label, snake_case or kebab-case form.
    pub fn parse(kind: EntityKind, value: &str) -> Result<Status, StatusParseError> {
        let wanted = normalize(value);
        statuses_for(kind)
            .into_iter()
            .find(|status| normalize(status.label()) == wanted)
            .ok_or_else(|| StatusParseError::UnknownStatus {
                kind,
                value: value.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<BookingStatus> for Status {
    fn from(s: BookingStatus) -> Self {
        Status::Booking(s)
    }
}

impl From<InvoiceStatus> for Status {
    fn from(s: InvoiceStatus) -> Self {
        Status::Invoice(s)
    }
}

impl From<EditingStatus> for Status {
    fn from(s: EditingStatus) -> Self {
        Status::EditingJob(s)
    }
}

/// All statuses of a kind, in lifecycle order.
pub fn statuses_for(kind: EntityKind) -> Vec<Status> {
    match kind {
        EntityKind::Booking => vec![
            BookingStatus::Pending.into(),
            BookingStatus::Confirmed.into(),
            BookingStatus::Completed.into(),
            BookingStatus::Cancelled.into(),
        ],
        EntityKind::Invoice => vec![
            InvoiceStatus::Draft.into(),
            InvoiceStatus::Sent.into(),
            InvoiceStatus::Paid.into(),
            InvoiceStatus::Overdue.into(),
        ],
        EntityKind::EditingJob => vec![
            EditingStatus::Queue.into(),
            EditingStatus::InProgress.into(),
            EditingStatus::ClientReview.into(),
            EditingStatus::RevisionsNeeded.into(),
            EditingStatus::Completed.into(),
        ],
    }
}

/// Render an optional current status the way error messages expect.
pub fn describe(status: Option<Status>) -> &'static str {
    status.map(|s| s.label()).unwrap_or("none")
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}
