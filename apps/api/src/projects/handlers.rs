use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::assist::{self, RewriteRequest, Tone};
use crate::errors::AppError;
use crate::export::render_html;
use crate::layout::engine;
use crate::layout::rows::top_level_count;
use crate::layout::{
    organize_into_rows, LayoutError, Project, ProjectType, RowId, Section, SectionContent,
    SplitSide,
};
use crate::layout::validate::{validate, Violation};
use crate::projects::editor::{apply_layout_edit, EditOutcome};
use crate::projects::templates::{self, default_layout, find_template, Template};
use crate::state::AppState;
use crate::store::{NewProject, ProjectUpdate};

const MAX_POLL_SECS: u64 = 60;
const DEFAULT_POLL_SECS: u64 = 25;

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub template_id: Option<String>,
    pub layout: Option<Vec<Section>>,
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub user_id: Uuid,
    pub title: String,
}

#[derive(Deserialize)]
pub struct InsertSectionRequest {
    pub user_id: Uuid,
    /// Top-level slot to insert at; appends when absent.
    pub position: Option<usize>,
}

#[derive(Deserialize)]
pub struct SplitRequest {
    pub user_id: Uuid,
    pub side: SplitSide,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAxis {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub user_id: Uuid,
    pub target_id: String,
    #[serde(default)]
    pub axis: MoveAxis,
}

#[derive(Deserialize)]
pub struct UpdateSectionRequest {
    pub user_id: Uuid,
    pub title: Option<String>,
    /// Editor text; comma-separated for skills.
    pub content: String,
}

#[derive(Deserialize)]
pub struct RewriteBody {
    pub user_id: Uuid,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    pub prompt: String,
}

#[derive(Deserialize)]
pub struct ChangesQuery {
    pub user_id: Uuid,
    pub timeout_secs: Option<u64>,
}

#[derive(Serialize)]
pub struct ChangesResponse {
    pub changed: bool,
    pub projects: Vec<Project>,
}

#[derive(Serialize)]
pub struct RowView {
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<RowId>,
    pub sections: Vec<Section>,
}

#[derive(Serialize)]
pub struct RowsResponse {
    pub rows: Vec<RowView>,
    pub violations: Vec<Violation>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_owned(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Project, AppError> {
    let project = state.store.get(id).await?;
    if project.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(project)
}

fn section_of<'a>(project: &'a Project, section_id: &str) -> Result<&'a Section, AppError> {
    project
        .layout
        .iter()
        .find(|s| s.id == section_id)
        .ok_or_else(|| LayoutError::SectionNotFound(section_id.to_string()).into())
}

/// Runs a layout edit against the store and maps a rollback to a 503 carrying the snapshot.
async fn edit_layout<F>(
    state: &AppState,
    project: &Project,
    edit: F,
) -> Result<Json<Project>, AppError>
where
    F: FnOnce(&[Section]) -> Result<Vec<Section>, LayoutError>,
{
    match apply_layout_edit(state.store.as_ref(), project, edit).await? {
        EditOutcome::Applied(updated) => Ok(Json(updated)),
        EditOutcome::RolledBack { snapshot, error } => Err(AppError::Persistence {
            message: error.to_string(),
            snapshot,
        }),
    }
}

fn check_client_layout(layout: &[Section], project_type: ProjectType) -> Result<(), AppError> {
    let violations = validate(layout);
    if !violations.is_empty() {
        return Err(AppError::Validation(format!(
            "layout is malformed: {violations:?}"
        )));
    }
    let max = project_type.max_sections();
    if top_level_count(layout) > max {
        return Err(LayoutError::LimitReached { project_type, max }.into());
    }
    Ok(())
}

fn untitled(project_type: ProjectType) -> &'static str {
    match project_type {
        ProjectType::Resume => "Untitled Resume",
        ProjectType::CoverLetter => "Untitled Cover Letter",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.store.list(params.user_id).await?))
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let template = match req.template_id.as_deref() {
        Some(id) => Some(
            find_template(id).ok_or_else(|| AppError::NotFound(format!("Template {id}")))?,
        ),
        None => None,
    };

    let project_type = match (&template, req.project_type) {
        (Some(t), Some(requested)) if t.project_type != requested => {
            return Err(AppError::Validation(format!(
                "template {} is a {}, not a {requested}",
                t.id, t.project_type
            )));
        }
        (Some(t), _) => t.project_type,
        (None, Some(requested)) => requested,
        (None, None) => {
            return Err(AppError::Validation(
                "type is required without a template".to_string(),
            ))
        }
    };

    let layout = match (req.layout, &template) {
        (Some(layout), _) => {
            check_client_layout(&layout, project_type)?;
            layout
        }
        (None, Some(t)) => t.layout.clone(),
        (None, None) => default_layout(project_type),
    };

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| untitled(project_type).to_string());

    let created = state
        .store
        .create(
            req.user_id,
            NewProject {
                title,
                project_type,
                layout,
            },
        )
        .await?;
    info!("Project {} created ({})", created.id, created.project_type);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(load_owned(&state, id, params.user_id).await?))
}

/// PATCH /api/v1/projects/:id
pub async fn handle_rename_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<Project>, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    load_owned(&state, id, req.user_id).await?;
    let updated = state.store.update(id, ProjectUpdate::title(title)).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    load_owned(&state, id, params.user_id).await?;
    state.store.delete(id).await?;
    info!("Project {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/changes
///
/// Long-poll: resolves with the next snapshot of the caller's projects, or with
/// the current one and `changed: false` once the timeout elapses.
pub async fn handle_project_changes(
    State(state): State<AppState>,
    Query(params): Query<ChangesQuery>,
) -> Result<Json<ChangesResponse>, AppError> {
    let mut rx = state.store.subscribe(params.user_id).await?;
    let wait = Duration::from_secs(
        params
            .timeout_secs
            .unwrap_or(DEFAULT_POLL_SECS)
            .min(MAX_POLL_SECS),
    );

    let changed = matches!(tokio::time::timeout(wait, rx.changed()).await, Ok(Ok(())));
    let projects = rx.borrow_and_update().clone();
    debug!("Change poll for user {} returned (changed: {changed})", params.user_id);
    Ok(Json(ChangesResponse { changed, projects }))
}

// ────────────────────────────────────────────────────────────────────────────
// Layout edits
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects/:id/sections
pub async fn handle_insert_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InsertSectionRequest>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    let project_type = project.project_type;
    edit_layout(&state, &project, |layout| {
        engine::insert_section(layout, req.position, project_type)
    })
    .await
}

/// POST /api/v1/projects/:id/sections/:sid/split
pub async fn handle_split_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    edit_layout(&state, &project, |layout| {
        engine::split_into_columns(layout, &section_id, req.side)
    })
    .await
}

/// POST /api/v1/projects/:id/sections/:sid/move
pub async fn handle_move_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    let project_type = project.project_type;
    edit_layout(&state, &project, |layout| match req.axis {
        MoveAxis::Vertical => {
            engine::reorder_vertical(layout, &section_id, &req.target_id, project_type)
        }
        MoveAxis::Horizontal => engine::reorder_horizontal(layout, &section_id, &req.target_id),
    })
    .await
}

/// PATCH /api/v1/projects/:id/sections/:sid
pub async fn handle_update_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    let content = SectionContent::coerce(section_of(&project, &section_id)?.section_type, &req.content);
    edit_layout(&state, &project, |layout| {
        engine::update_section_content(layout, &section_id, req.title, content)
    })
    .await
}

/// DELETE /api/v1/projects/:id/sections/:sid
pub async fn handle_delete_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, params.user_id).await?;
    edit_layout(&state, &project, |layout| {
        engine::delete_section(layout, &section_id)
    })
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// AI
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects/:id/sections/:sid/rewrite
pub async fn handle_rewrite_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(req): Json<RewriteBody>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    let section = section_of(&project, &section_id)?;

    let request = RewriteRequest {
        title: section.title.clone(),
        content: section.content.as_display(),
        section_type: section.section_type,
        project_type: project.project_type,
        tone: req.tone,
    };
    let rewritten = state.assistant.rewrite_section(&request).await?;
    info!(
        "Section {section_id} rewritten by {} ({} tone)",
        state.assistant.name(),
        req.tone.as_str()
    );

    let title = rewritten.title.or(request.title);
    let content = SectionContent::coerce(section.section_type, &rewritten.content);
    edit_layout(&state, &project, |layout| {
        engine::update_section_content(layout, &section_id, title, content)
    })
    .await
}

/// POST /api/v1/projects/:id/generate
pub async fn handle_generate_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Project>, AppError> {
    let project = load_owned(&state, id, req.user_id).await?;
    let sections = assist::generate_layout(
        state.assistant.as_ref(),
        &req.prompt,
        &project.layout,
        project.project_type,
    )
    .await?;
    info!(
        "Generated {} sections for project {id} via {}",
        sections.len(),
        state.assistant.name()
    );
    edit_layout(&state, &project, move |_| Ok(sections)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Views
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/projects/:id/rows
pub async fn handle_project_rows(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<Json<RowsResponse>, AppError> {
    let project = load_owned(&state, id, params.user_id).await?;
    let rows = organize_into_rows(&project.layout)
        .into_iter()
        .map(|(position, members)| RowView {
            position,
            row: members.first().and_then(|s| s.row),
            sections: members.into_iter().cloned().collect(),
        })
        .collect();
    Ok(Json(RowsResponse {
        rows,
        violations: validate(&project.layout),
    }))
}

/// GET /api/v1/projects/:id/export
pub async fn handle_export_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<Html<String>, AppError> {
    let project = load_owned(&state, id, params.user_id).await?;
    Ok(Html(render_html(&project)))
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<Template>> {
    Json(templates::templates())
}
