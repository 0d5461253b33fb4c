use anyhow::Result;

use super::{parse_kind_arg, parse_status_arg};
use crate::workflows::registry::TransitionRegistry;
use crate::workflows::status::describe;

/// Lists legal targets from a status
pub struct TransitionsCommand {
    pub kind: String,
    pub status: Option<String>,
}

impl TransitionsCommand {
    pub fn new(kind: String, status: Option<String>) -> Self {
        Self { kind, status }
    }

    pub async fn execute(&self) -> Result<()> {
        let kind = parse_kind_arg(&self.kind)?;
        let current = match &self.status {
            Some(status) => parse_status_arg(kind, status)?,
            None => None,
        };

        let registry = TransitionRegistry::studio();
        let targets = registry.targets_from(kind, current);

        if targets.is_empty() {
            println!("{} {} has no outgoing transitions", kind, describe(current));
            return Ok(());
        }

        println!("{} {} can move to:", kind, describe(current));
        for target in targets {
            if let Some(transition) = registry.find(kind, current, target) {
                let guard = transition
                    .guard
                    .as_ref()
                    .map(|g| format!(" [requires {}]", g.name()))
                    .unwrap_or_default();
                println!("  → {:<18} via {}{}", target.label(), transition.name, guard);
            }
        }
        Ok(())
    }
}

/// Answers whether one transition is legal
pub struct CheckCommand {
    pub kind: String,
    pub from: String,
    pub to: String,
}

impl CheckCommand {
    pub fn new(kind: String, from: String, to: String) -> Self {
        Self { kind, from, to }
    }

    /// Returns whether the transition is legal so the caller can pick an exit code
    pub async fn execute(&self) -> Result<bool> {
        let kind = parse_kind_arg(&self.kind)?;
        let from = parse_status_arg(kind, &self.from)?;
        let to = crate::workflows::status::Status::parse(kind, &self.to)?;

        let registry = TransitionRegistry::studio();
        let legal = registry.targets_from(kind, from).contains(&to);
        if legal {
            println!("✅ {} {} → {} is allowed", kind, describe(from), to);
        } else {
            println!("❌ Invalid transition from {} to {}", describe(from), to);
        }
        Ok(legal)
    }
}
