// Status badges for UI-adjacent callers

use serde::{Deserialize, Serialize};

use super::status::{BookingStatus, EditingStatus, InvoiceStatus, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Neutral,
    Info,
    Progress,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl Status {
    pub fn badge(&self) -> StatusBadge {
        let tone = match self {
            Status::Booking(s) => match s {
                BookingStatus::Pending => BadgeTone::Warning,
                BookingStatus::Confirmed => BadgeTone::Info,
                BookingStatus::Completed => BadgeTone::Success,
                BookingStatus::Cancelled => BadgeTone::Danger,
            },
            Status::Invoice(s) => match s {
                InvoiceStatus::Draft => BadgeTone::Neutral,
                InvoiceStatus::Sent => BadgeTone::Info,
                InvoiceStatus::Paid => BadgeTone::Success,
                InvoiceStatus::Overdue => BadgeTone::Danger,
            },
            Status::EditingJob(s) => match s {
                EditingStatus::Queue => BadgeTone::Neutral,
                EditingStatus::InProgress => BadgeTone::Progress,
                EditingStatus::ClientReview => BadgeTone::Info,
                EditingStatus::RevisionsNeeded => BadgeTone::Warning,
                EditingStatus::Completed => BadgeTone::Success,
            },
        };
        StatusBadge {
            label: self.label(),
            tone,
        }
    }

    /// Terminal statuses have no outgoing edges in the studio table.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::Booking(BookingStatus::Completed | BookingStatus::Cancelled)
                | Status::Invoice(InvoiceStatus::Paid)
                | Status::EditingJob(EditingStatus::Completed)
        )
    }
}
