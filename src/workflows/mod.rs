// Entity workflow engine
// Status changes go through the registry, a guard, one atomic commit, then best-effort side effects.

pub mod effects;
pub mod entity;
pub mod guards;
pub mod presentation;
pub mod registry;
pub mod state_machine;
pub mod status;
pub mod transition;

pub use entity::{Booking, EditingJob, Entity, Invoice};
pub use presentation::{BadgeTone, StatusBadge};
pub use registry::{RegistryError, TransitionRegistry};
pub use state_machine::{FailureKind, TransitionResult, WorkflowEngine, VALIDATION_FAILED};
pub use status::{statuses_for, BookingStatus, EditingStatus, EntityKind, InvoiceStatus, Status};
pub use transition::{Guard, SideEffect, Transition, TransitionContext, Verdict};
