//! Application layer: project CRUD, layout edits with rollback, AI actions,
//! and the starter templates.

pub mod editor;
pub mod handlers;
pub mod templates;
