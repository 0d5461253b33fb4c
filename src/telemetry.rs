use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::workflows::status::{EntityKind, Status};

/// Initialize structured logging.
/// RUST_LOG wins over the configured level when set.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("studio-flow telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one transition
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one execute_transition call
pub fn create_transition_span(
    kind: EntityKind,
    entity_id: &str,
    target: Status,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "entity_transition",
        entity.kind = %kind,
        entity.id = entity_id,
        target = %target,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}
