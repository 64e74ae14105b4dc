//! Project Store: pluggable persistence for projects and their layouts.
//!
//! - `PgProjectStore`: durable, PostgreSQL via sqlx.
//! - `MemoryProjectStore`: demo mode, process-local.
//!
//! Selected once at startup from `Config` and carried in `AppState` as
//! `Arc<dyn ProjectStore>`. Timestamps are always set by the store.
//! Writes are never retried here; callers decide how to recover.

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::warn;
use uuid::Uuid;

use crate::layout::model::{Project, ProjectType, Section};

pub mod memory;
pub mod postgres;

pub use memory::MemoryProjectStore;
pub use postgres::PgProjectStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored project is corrupt: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Fields supplied by the caller when creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub project_type: ProjectType,
    pub layout: Vec<Section>,
}

/// Partial update; `None` fields are left as stored.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub layout: Option<Vec<Section>>,
}

impl ProjectUpdate {
    pub fn layout(layout: Vec<Section>) -> Self {
        Self {
            title: None,
            layout: Some(layout),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            layout: None,
        }
    }
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, user_id: Uuid, project: NewProject) -> Result<Project, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Project, StoreError>;

    /// All of a user's projects, most recently updated first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError>;

    async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Push-based view of `list(user_id)`. Every value is a full snapshot.
    async fn subscribe(&self, user_id: Uuid) -> Result<watch::Receiver<Vec<Project>>, StoreError>;
}

/// Per-user snapshot channels shared by the store implementations.
///
/// Snapshots are loaded while the channel map is locked, so a subscriber never
/// starts from a list older than a write it missed, and publishes go out in
/// the order their snapshots were read.
#[derive(Default)]
pub struct Subscriptions {
    senders: Mutex<HashMap<Uuid, watch::Sender<Vec<Project>>>>,
}

impl Subscriptions {
    /// Returns a receiver, seeding a new channel from `load` if none is open yet.
    pub async fn subscribe<F, Fut>(
        &self,
        user_id: Uuid,
        load: F,
    ) -> Result<watch::Receiver<Vec<Project>>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Project>, StoreError>>,
    {
        let mut senders = self.senders.lock().await;
        if let Some(sender) = senders.get(&user_id).filter(|s| !s.is_closed()) {
            return Ok(sender.subscribe());
        }
        let (sender, receiver) = watch::channel(load().await?);
        senders.insert(user_id, sender);
        Ok(receiver)
    }

    /// Pushes a fresh snapshot to the user's subscribers, if any are listening.
    ///
    /// Best-effort: the write that triggered it has already landed, so a failed
    /// reload is logged and the previous snapshot stays current.
    pub async fn refresh<F, Fut>(&self, user_id: Uuid, load: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Project>, StoreError>>,
    {
        let mut senders = self.senders.lock().await;
        let Some(sender) = senders.get(&user_id) else {
            return;
        };
        if sender.is_closed() {
            senders.remove(&user_id);
            return;
        }
        match load().await {
            Ok(snapshot) => {
                sender.send_replace(snapshot);
            }
            Err(e) => warn!("Could not publish project snapshot for user {user_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(user_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "CV".into(),
            project_type: ProjectType::Resume,
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            layout: vec![],
        }
    }

    async fn unavailable() -> Result<Vec<Project>, StoreError> {
        Err(StoreError::Unavailable("list failed".into()))
    }

    async fn never_called() -> Result<Vec<Project>, StoreError> {
        panic!("loader ran with no subscribers")
    }

    async fn empty() -> Result<Vec<Project>, StoreError> {
        Ok(vec![])
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_last_snapshot() {
        let subscriptions = Subscriptions::default();
        let user = Uuid::new_v4();
        let mut rx = subscriptions
            .subscribe(user, empty)
            .await
            .unwrap();

        subscriptions.refresh(user, unavailable).await;
        assert!(!rx.has_changed().unwrap());

        let fresh = project(user);
        let published = vec![fresh.clone()];
        subscriptions
            .refresh(user, move || async move { Ok::<_, StoreError>(published) })
            .await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![fresh]);
    }

    #[tokio::test]
    async fn test_refresh_without_subscribers_skips_the_load() {
        let subscriptions = Subscriptions::default();
        subscriptions.refresh(Uuid::new_v4(), never_called).await;
    }

    #[tokio::test]
    async fn test_second_subscriber_shares_the_open_channel() {
        let subscriptions = Subscriptions::default();
        let user = Uuid::new_v4();
        let first = subscriptions
            .subscribe(user, move || async move { Ok::<_, StoreError>(vec![project(user)]) })
            .await
            .unwrap();
        let second = subscriptions.subscribe(user, unavailable).await.unwrap();
        assert_eq!(*first.borrow(), *second.borrow());
    }

    #[tokio::test]
    async fn test_subscribe_after_all_receivers_dropped_reloads() {
        let subscriptions = Subscriptions::default();
        let user = Uuid::new_v4();
        drop(
            subscriptions
                .subscribe(user, empty)
                .await
                .unwrap(),
        );
        let rx = subscriptions
            .subscribe(user, move || async move { Ok::<_, StoreError>(vec![project(user)]) })
            .await
            .unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
