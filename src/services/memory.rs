use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{CommitRequest, ConflictChecker, EntityStore, StoreError, TransitionRecord};
use crate::workflows::entity::{Booking, Entity};
use crate::workflows::status::{describe, BookingStatus, EntityKind, Status};

/// Serialized form of a store, used by the CLI to keep state between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub history: Vec<TransitionRecord>,
}

/// In-process entity store. Commits are serialized by a single write lock.
#[derive(Debug)]
pub struct MemoryStore {
    entities: RwLock<HashMap<(EntityKind, String), Entity>>,
    history: RwLock<Vec<TransitionRecord>>,
    conflict_window: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(120)
    }
}

impl MemoryStore {
    pub fn new(conflict_window_minutes: i64) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
            conflict_window: conflict_window(conflict_window_minutes),
        }
    }

    /// Build a store from a dataset; two entries with the same kind and id are rejected like a duplicate insert.
    pub fn from_dataset(dataset: Dataset, conflict_window_minutes: i64) -> Result<Self, StoreError> {
        let mut entities = HashMap::with_capacity(dataset.entities.len());
        for entity in dataset.entities {
            let key = (entity.kind(), entity.id().to_string());
            if entities.contains_key(&key) {
                return Err(StoreError::AlreadyExists {
                    kind: key.0,
                    id: key.1,
                });
            }
            entities.insert(key, entity);
        }
        Ok(Self {
            entities: RwLock::new(entities),
            history: RwLock::new(dataset.history),
            conflict_window: conflict_window(conflict_window_minutes),
        })
    }

    pub async fn to_dataset(&self) -> Dataset {
        let mut entities: Vec<Entity> = self.entities.read().await.values().cloned().collect();
        entities.sort_by(|a, b| (a.kind().tag(), a.id()).cmp(&(b.kind().tag(), b.id())));
        Dataset {
            entities,
            history: self.history.read().await.clone(),
        }
    }

    pub async fn load_json<P: AsRef<Path>>(path: P, conflict_window_minutes: i64) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            entities = dataset.entities.len(),
            "Loaded studio dataset"
        );
        Ok(Self::from_dataset(dataset, conflict_window_minutes)?)
    }

    pub async fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let dataset = self.to_dataset().await;
        let raw = serde_json::to_string_pretty(&dataset)?;
        tokio::fs::write(path.as_ref(), raw).await?;
        Ok(())
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        self.entities.read().await.get(&(kind, id.to_string())).cloned()
    }

    pub async fn status_of(&self, kind: EntityKind, id: &str) -> Option<Status> {
        self.get(kind, id).await.and_then(|e| e.status())
    }

    pub async fn history(&self) -> Vec<TransitionRecord> {
        self.history.read().await.clone()
    }

    pub async fn entities_of(&self, kind: EntityKind) -> Vec<Entity> {
        self.entities
            .read()
            .await
            .values()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<Entity>, StoreError> {
        Ok(self.get(kind, id).await)
    }

    async fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        let key = (entity.kind(), entity.id().to_string());
        let mut entities = self.entities.write().await;
        if entities.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: key.0,
                id: key.1,
            });
        }
        entities.insert(key, entity);
        Ok(())
    }

    async fn commit_status(&self, request: CommitRequest) -> Result<(), StoreError> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(&(request.kind, request.id.clone()))
            .ok_or_else(|| StoreError::NotFound {
                kind: request.kind,
                id: request.id.clone(),
            })?;

        if let Some(expected) = request.expected {
            let found = entity.status();
            if found != expected {
                return Err(StoreError::StatusConflict {
                    kind: request.kind,
                    id: request.id,
                    expected: describe(expected).to_string(),
                    found: describe(found).to_string(),
                });
            }
        }

        if !entity.set_status(request.new_status) {
            return Err(StoreError::Backend(format!(
                "status {} does not belong to {}",
                request.new_status, request.kind
            )));
        }

        // History is appended while the entity lock is still held
        self.history.write().await.push(request.record);
        debug!(kind = %request.kind, id = %request.id, status = %request.new_status, "Status stored");
        Ok(())
    }
}

#[async_trait]
impl ConflictChecker for MemoryStore {
    async fn find_conflicts(
        &self,
        photographer_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let entities = self.entities.read().await;
        let conflicts = entities
            .values()
            .filter_map(Entity::as_booking)
            .filter(|b| clashes_with(b, photographer_id, at, self.conflict_window))
            .cloned()
            .collect();
        Ok(conflicts)
    }
}

/// Conflict window from configured minutes; values past what a duration can hold saturate.
pub(crate) fn conflict_window(minutes: i64) -> Duration {
    Duration::try_minutes(minutes).unwrap_or_else(|| {
        warn!(minutes, "Conflict window out of range, using the largest window");
        if minutes < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        }
    })
}

/// An active booking of the same photographer closer than `window` to `at`.
pub(crate) fn clashes_with(booking: &Booking, photographer_id: &str, at: DateTime<Utc>, window: Duration) -> bool {
    booking.photographer_id.as_deref() == Some(photographer_id)
        && matches!(booking.status, Some(s) if s != BookingStatus::Cancelled)
        && (booking.scheduled_at - at).abs() < window
}
