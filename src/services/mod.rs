// Collaborator interfaces consulted by the workflow engine
// Separating concerns for testability: every outside call goes through one of these traits

pub mod documents;
pub mod memory;
pub mod notify;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::workflows::entity::{Booking, Entity};
use crate::workflows::status::{EntityKind, Status};

pub use documents::DraftInvoiceGenerator;
pub use memory::MemoryStore;
pub use notify::LoggingNotifier;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("Status of {kind} {id} changed concurrently: expected {expected}, found {found}")]
    StatusConflict {
        kind: EntityKind,
        id: String,
        expected: String,
        found: String,
    },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Audit entry persisted together with a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub transition: String,
    pub from: Option<Status>,
    pub to: Status,
    pub note: Option<String>,
    pub correlation_id: String,
    pub committed_at: DateTime<Utc>,
}

/// A single status write. `expected` set means compare-and-swap on the stored status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub kind: EntityKind,
    pub id: String,
    pub expected: Option<Option<Status>>,
    pub new_status: Status,
    pub record: TransitionRecord,
}

/// Storage collaborator; each call is atomic.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<Entity>, StoreError>;

    async fn insert(&self, entity: Entity) -> Result<(), StoreError>;

    async fn commit_status(&self, request: CommitRequest) -> Result<(), StoreError>;
}

/// Read-only scheduling lookup used by booking validation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConflictChecker: Send + Sync {
    async fn find_conflicts(
        &self,
        photographer_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Create the invoice for a confirmed booking, returning its id.
    async fn generate_invoice(&self, booking: &Booking) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
    InvoiceIssued,
    InvoiceOverdue,
    PaymentReceived,
    ReviewReady,
    DeliveryReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub recipient: String,
    pub send_at: DateTime<Utc>,
    /// Follow-up reminder, e.g. a payment reminder ahead of the due date.
    pub remind_at: Option<DateTime<Utc>>,
}

/// Fire-and-forget notification scheduling.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(&self, notification: Notification) -> Result<(), ServiceError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for deterministic date checks.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Collaborators injected into the engine.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn EntityStore>,
    pub conflicts: Arc<dyn ConflictChecker>,
    pub documents: Arc<dyn DocumentGenerator>,
    pub notifier: Arc<dyn NotificationScheduler>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// In-process wiring: memory store for storage and conflicts, drafts invoices into the same store.
    pub fn in_memory(store: Arc<MemoryStore>, invoice_due_days: i64) -> Self {
        Self {
            store: store.clone(),
            conflicts: store.clone(),
            documents: Arc::new(DraftInvoiceGenerator::new(store, invoice_due_days)),
            notifier: Arc::new(LoggingNotifier::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationScheduler>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_documents(mut self, documents: Arc<dyn DocumentGenerator>) -> Self {
        self.documents = documents;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
