use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::parse_kind_arg;
use crate::config::WorkflowSettings;
use crate::services::memory::MemoryStore;
use crate::services::Services;
use crate::workflows::registry::TransitionRegistry;
use crate::workflows::state_machine::{TransitionResult, WorkflowEngine};
use crate::workflows::status::Status;

/// Applies one transition to an entity held in a JSON dataset file
pub struct TransitionCommand {
    pub data: PathBuf,
    pub kind: String,
    pub id: String,
    pub to: String,
    pub note: Option<String>,
    pub dry_run: bool,
    settings: WorkflowSettings,
}

impl TransitionCommand {
    pub fn new(data: PathBuf, kind: String, id: String, to: String, settings: WorkflowSettings) -> Self {
        Self {
            data,
            kind,
            id,
            to,
            note: None,
            dry_run: false,
            settings,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the transition and return its result; the dataset is saved back whenever
    /// the status was committed, so a failed side effect still persists the new status.
    pub async fn execute(&self) -> Result<TransitionResult> {
        let kind = parse_kind_arg(&self.kind)?;
        let target = Status::parse(kind, &self.to)?;

        let store = Arc::new(
            MemoryStore::load_json(&self.data, self.settings.conflict_window_minutes).await?,
        );
        let mut entity = store
            .get(kind, &self.id)
            .await
            .ok_or_else(|| anyhow!("{} {} not found in {}", kind, self.id, self.data.display()))?;

        let services = Services::in_memory(store.clone(), self.settings.invoice_due_days);
        let engine = WorkflowEngine::new(
            Arc::new(TransitionRegistry::studio()),
            services,
            self.settings.clone(),
        );

        let result = engine
            .execute_transition(kind, &mut entity, target, self.note.as_deref())
            .await;

        if result.status_committed && !self.dry_run {
            store.save_json(&self.data).await?;
            info!(path = %self.data.display(), "Dataset saved");
        }
        engine.metrics().log_stats();

        Ok(result)
    }
}
