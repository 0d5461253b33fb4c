use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::config::StudioFlowConfig;

/// Writes the default configuration; refuses to overwrite unless forced
pub struct InitConfigCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl InitConfigCommand {
    pub fn new(path: PathBuf, force: bool) -> Self {
        Self { path, force }
    }

    pub async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite it.",
                self.path.display()
            ));
        }

        StudioFlowConfig::default().save_to_file(&self.path)?;
        println!("✅ Wrote default configuration to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_file_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio-flow.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(InitConfigCommand::new(path.clone(), false).execute().await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        InitConfigCommand::new(path.clone(), true).execute().await.unwrap();
        let loaded = StudioFlowConfig::load_from(&path).unwrap();
        assert_eq!(loaded.workflow.invoice_due_days, 14);
    }
}
