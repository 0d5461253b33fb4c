use anyhow::Result;

use super::parse_kind_arg;
use crate::workflows::status::{statuses_for, EntityKind};

pub struct StatusesCommand {
    pub kind: Option<String>,
}

impl StatusesCommand {
    pub fn new(kind: Option<String>) -> Self {
        Self { kind }
    }

    pub async fn execute(&self) -> Result<()> {
        let kinds = match &self.kind {
            Some(kind) => vec![parse_kind_arg(kind)?],
            None => EntityKind::ALL.to_vec(),
        };

        for kind in kinds {
            println!("{}:", kind);
            for status in statuses_for(kind) {
                let badge = status.badge();
                let terminal = if status.is_terminal() { " (terminal)" } else { "" };
                println!("  {:<18} {:?}{}", badge.label, badge.tone, terminal);
            }
            println!();
        }
        Ok(())
    }
}
