// Layout model and Arrangement Engine.
// Pure, synchronous code: no storage, no async, no HTTP. Handlers call the
// engine, then persist the returned layout through the injected store.

pub mod engine;
pub mod model;
pub mod rows;
pub mod validate;

// Re-export the public API consumed by other modules (projects, assist, export).
pub use engine::{LayoutError, SplitSide};
pub use model::{Project, ProjectType, RowId, Section, SectionContent, SectionType};
pub use rows::organize_into_rows;
