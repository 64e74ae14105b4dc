//! Process-local project store for demo mode.
//!
//! Nothing survives a restart. Timestamps are strictly increasing so the
//! most-recently-updated ordering is stable even for back-to-back writes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::layout::model::Project;
use crate::store::{NewProject, ProjectStore, ProjectUpdate, StoreError, Subscriptions};

#[derive(Default)]
struct Inner {
    projects: HashMap<Uuid, Project>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(next);
        next
    }

    fn list(&self, user_id: Uuid) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    inner: RwLock<Inner>,
    subscriptions: Subscriptions,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `project` for `user_id` unless that user already has projects.
    pub async fn seed(&self, user_id: Uuid, project: NewProject) -> Result<(), StoreError> {
        if !self.list(user_id).await?.is_empty() {
            return Ok(());
        }
        let created = self.create(user_id, project).await?;
        info!("Seeded demo project '{}' for user {user_id}", created.title);
        Ok(())
    }

    async fn notify(&self, user_id: Uuid) {
        self.subscriptions
            .refresh(user_id, || async {
                Ok::<_, StoreError>(self.inner.read().await.list(user_id))
            })
            .await;
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, user_id: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let created = {
            let mut inner = self.inner.write().await;
            let now = inner.stamp();
            let created = Project {
                id: Uuid::new_v4(),
                title: project.title,
                project_type: project.project_type,
                user_id,
                created_at: now,
                updated_at: now,
                layout: project.layout,
            };
            inner.projects.insert(created.id, created.clone());
            created
        };
        self.notify(user_id).await;
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Project, StoreError> {
        self.inner
            .read()
            .await
            .projects
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        Ok::<_, StoreError>(self.inner.read().await.list(user_id))
    }

    async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, StoreError> {
        let updated = {
            let mut inner = self.inner.write().await;
            let now = inner.stamp();
            let project = inner
                .projects
                .get_mut(&id)
                .ok_or(StoreError::NotFound(id))?;
            if let Some(title) = update.title {
                project.title = title;
            }
            if let Some(layout) = update.layout {
                project.layout = layout;
            }
            project.updated_at = now;
            project.clone()
        };
        self.notify(updated.user_id).await;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let removed = self
            .inner
            .write()
            .await
            .projects
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        self.notify(removed.user_id).await;
        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid) -> Result<watch::Receiver<Vec<Project>>, StoreError> {
        self.subscriptions
            .subscribe(user_id, || async {
                Ok::<_, StoreError>(self.inner.read().await.list(user_id))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{ProjectType, Section, SectionContent, SectionType};

    fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            project_type: ProjectType::Resume,
            layout: vec![Section::new(
                "header-1",
                SectionType::Header,
                Some("Your Name"),
                SectionContent::from("Professional Title"),
                0,
            )],
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryProjectStore::new();
        let user = Uuid::new_v4();
        let created = store.create(user, new_project("CV")).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_list_is_most_recently_updated_first_and_per_user() {
        let store = MemoryProjectStore::new();
        let user = Uuid::new_v4();
        let first = store.create(user, new_project("first")).await.unwrap();
        let second = store.create(user, new_project("second")).await.unwrap();
        store.create(Uuid::new_v4(), new_project("other")).await.unwrap();

        let titles: Vec<String> = store.list(user).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["second", "first"]);

        store.update(first.id, ProjectUpdate::title("first v2")).await.unwrap();
        let listed = store.list(user).await.unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert!(listed[0].updated_at > listed[0].created_at);
    }

    #[tokio::test]
    async fn test_update_layout_only_keeps_title() {
        let store = MemoryProjectStore::new();
        let created = store.create(Uuid::new_v4(), new_project("CV")).await.unwrap();
        let updated = store
            .update(created.id, ProjectUpdate::layout(vec![]))
            .await
            .unwrap();
        assert_eq!(updated.title, "CV");
        assert!(updated.layout.is_empty());
    }

    #[tokio::test]
    async fn test_missing_project_errors() {
        let store = MemoryProjectStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id).await, Err(StoreError::NotFound(x)) if x == id));
        assert!(store.update(id, ProjectUpdate::default()).await.is_err());
        assert!(store.delete(id).await.is_err());
    }

    #[tokio::test]
    async fn test_subscribe_receives_full_snapshots() {
        let store = MemoryProjectStore::new();
        let user = Uuid::new_v4();
        let mut rx = store.subscribe(user).await.unwrap();
        assert!(rx.borrow().is_empty());

        let created = store.create(user, new_project("CV")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.delete(created.id).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_end_on_the_latest_snapshot() {
        let store = std::sync::Arc::new(MemoryProjectStore::new());
        let user = Uuid::new_v4();
        let rx = store.subscribe(user).await.unwrap();

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.create(user, new_project(&format!("cv-{i}"))).await.unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(*rx.borrow(), store.list(user).await.unwrap());
        assert_eq!(rx.borrow().len(), 16);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = MemoryProjectStore::new();
        let user = Uuid::new_v4();
        store.seed(user, new_project("demo")).await.unwrap();
        store.seed(user, new_project("demo again")).await.unwrap();
        let listed = store.list(user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "demo");
    }
}
