use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::layout::model::{Project, ProjectType, Section};
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub project_type: String,
    pub layout: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let project_type = ProjectType::parse(&row.project_type).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "project {} has unknown type '{}'",
                row.id, row.project_type
            ))
        })?;
        let layout: Vec<Section> = serde_json::from_value(row.layout)
            .map_err(|e| StoreError::Corrupt(format!("project {} layout: {e}", row.id)))?;

        Ok(Project {
            id: row.id,
            title: row.title,
            project_type,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            layout,
        })
    }
}
