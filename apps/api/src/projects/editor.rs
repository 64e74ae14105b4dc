//! Snapshot → edit → persist, with rollback on persistence failure.
//!
//! Engine errors abort before anything is written. A failed write is not
//! retried; the caller gets the pre-edit snapshot back so the client can
//! revert its optimistic view.

use tracing::{info, warn};

use crate::layout::engine::LayoutError;
use crate::layout::model::{Project, Section};
use crate::store::{ProjectStore, ProjectUpdate, StoreError};

#[derive(Debug)]
pub enum EditOutcome {
    Applied(Project),
    RolledBack {
        snapshot: Vec<Section>,
        error: StoreError,
    },
}

pub async fn apply_layout_edit<F>(
    store: &dyn ProjectStore,
    project: &Project,
    edit: F,
) -> Result<EditOutcome, LayoutError>
where
    F: FnOnce(&[Section]) -> Result<Vec<Section>, LayoutError>,
{
    let snapshot = project.layout.clone();
    let next = edit(&snapshot)?;

    match store.update(project.id, ProjectUpdate::layout(next)).await {
        Ok(updated) => {
            info!(
                "Saved layout for project {} ({} sections)",
                updated.id,
                updated.layout.len()
            );
            Ok(EditOutcome::Applied(updated))
        }
        Err(error) => {
            warn!("Layout save failed for project {}, rolling back: {error}", project.id);
            Ok(EditOutcome::RolledBack { snapshot, error })
        }
    }
}
