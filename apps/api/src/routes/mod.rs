pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::assist::handlers as assist_handlers;
use crate::projects::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects
        .route(
            "/api/v1/projects",
            get(handlers::handle_list_projects).post(handlers::handle_create_project),
        )
        .route(
            "/api/v1/projects/changes",
            get(handlers::handle_project_changes),
        )
        .route(
            "/api/v1/projects/:id",
            get(handlers::handle_get_project)
                .patch(handlers::handle_rename_project)
                .delete(handlers::handle_delete_project),
        )
        .route("/api/v1/projects/:id/rows", get(handlers::handle_project_rows))
        .route(
            "/api/v1/projects/:id/export",
            get(handlers::handle_export_project),
        )
        // Layout edits
        .route(
            "/api/v1/projects/:id/sections",
            post(handlers::handle_insert_section),
        )
        .route(
            "/api/v1/projects/:id/sections/:sid",
            patch(handlers::handle_update_section)
                .delete(handlers::handle_delete_section),
        )
        .route(
            "/api/v1/projects/:id/sections/:sid/split",
            post(handlers::handle_split_section),
        )
        .route(
            "/api/v1/projects/:id/sections/:sid/move",
            post(handlers::handle_move_section),
        )
        // AI
        .route(
            "/api/v1/projects/:id/sections/:sid/rewrite",
            post(handlers::handle_rewrite_section),
        )
        .route(
            "/api/v1/projects/:id/generate",
            post(handlers::handle_generate_layout),
        )
        .route(
            "/api/v1/assist/status",
            get(assist_handlers::handle_assist_status),
        )
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .with_state(state)
}
