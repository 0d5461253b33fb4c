// studio-flow library - status workflows for bookings, invoices and editing jobs
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod database;
pub mod observability;
pub mod services;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, init_config, CommitPolicy, StudioFlowConfig, WorkflowSettings};
pub use observability::{OperationTimer, WorkflowMetrics, WorkflowStats};
pub use services::{
    Clock, CommitRequest, ConflictChecker, DocumentGenerator, EntityStore, FixedClock, MemoryStore,
    Notification, NotificationKind, NotificationScheduler, ServiceError, Services, StoreError,
    SystemClock, TransitionRecord,
};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    Booking, EditingJob, Entity, EntityKind, Invoice, Status, TransitionRegistry, TransitionResult,
    WorkflowEngine,
};
