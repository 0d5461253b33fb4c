use anyhow::{anyhow, Result};

use crate::workflows::status::{EntityKind, Status};

pub mod init_config;
pub mod statuses;
pub mod transition;
pub mod transitions;

/// Parse a status argument; "none" and "" mean the entity has no status yet.
pub fn parse_status_arg(kind: EntityKind, value: &str) -> Result<Option<Status>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Status::parse(kind, trimmed).map(Some).map_err(|e| anyhow!(e))
}

pub fn parse_kind_arg(value: &str) -> Result<EntityKind> {
    value.parse::<EntityKind>().map_err(|e| anyhow!(e))
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("📸 studio-flow - booking, invoice and editing workflows");
    println!();
    println!("Query the workflow:");
    println!("  studio-flow statuses                      # Status labels and badges");
    println!("  studio-flow transitions booking Pending   # Where a booking can go next");
    println!("  studio-flow check invoice Draft Sent      # Is one move legal?");
    println!();
    println!("Change an entity:");
    println!("  studio-flow transition --data studio.json --kind booking --id bk-1 --to Confirmed");
    Ok(())
}
