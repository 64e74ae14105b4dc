//! Durable project store backed by PostgreSQL.
//!
//! Layouts are stored as JSONB in the wire format of `Section`. Subscriptions
//! only observe writes made through this process.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::layout::model::{Project, Section};
use crate::models::project::ProjectRow;
use crate::store::{NewProject, ProjectStore, ProjectUpdate, StoreError, Subscriptions};

pub struct PgProjectStore {
    pool: PgPool,
    subscriptions: Subscriptions,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            subscriptions: Subscriptions::default(),
        }
    }

    /// Runs after the write has committed, so a failed reload never fails the write.
    async fn notify(&self, user_id: Uuid) {
        self.subscriptions
            .refresh(user_id, || self.list(user_id))
            .await;
    }
}

fn layout_json(layout: &[Section]) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(layout).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create(&self, user_id: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (id, user_id, title, project_type, layout)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&project.title)
        .bind(project.project_type.as_str())
        .bind(layout_json(&project.layout)?)
        .fetch_one(&self.pool)
        .await?;

        info!("Created project {} for user {user_id}", row.id);
        let created = Project::try_from(row)?;
        self.notify(user_id).await;
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Project::try_from(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        sqlx::query_as::<_, ProjectRow>(
            "SELECT * FROM projects WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Project::try_from)
        .collect()
    }

    async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, StoreError> {
        let layout = update.layout.as_deref().map(layout_json).transpose()?;

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET title      = COALESCE($2, title),
                layout     = COALESCE($3, layout),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(layout)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        let updated = Project::try_from(row)?;
        self.notify(updated.user_id).await;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let user_id: Uuid =
            sqlx::query_scalar("DELETE FROM projects WHERE id = $1 RETURNING user_id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::NotFound(id))?;

        info!("Deleted project {id}");
        self.notify(user_id).await;
        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid) -> Result<watch::Receiver<Vec<Project>>, StoreError> {
        self.subscriptions
            .subscribe(user_id, || self.list(user_id))
            .await
    }
}
