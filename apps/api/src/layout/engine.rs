//! Arrangement Engine: the only code allowed to restructure a layout.
//!
//! Every operation borrows the current layout and returns a new one, so a
//! failed operation leaves the caller's copy untouched. After every structural
//! edit the top-level entries carry the orders `0..n`, and every row keeps
//! dense columns and a correct `columns_in_row`.
//!
//! The engine does not repair layouts that arrive malformed. Operations that
//! would have to guess at a broken row return `InvariantViolation` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::layout::model::{ProjectType, RowId, Section, SectionContent, SectionType};
use crate::layout::rows::{row_members, top_level_entries, Entry};
use crate::layout::validate::check_row;

pub const PLACEHOLDER_TITLE: &str = "New Section";
pub const PLACEHOLDER_CONTENT: &str = "Add your content here...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{project_type} layouts are limited to {max} sections to fit on one page")]
    LimitReached {
        project_type: ProjectType,
        max: usize,
    },

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Sections '{moved}' and '{target}' are not in the same row")]
    NotSameRow { moved: String, target: String },

    #[error("Layout invariant violated: {0}")]
    InvariantViolation(String),
}

/// Which side of the target a horizontal drop landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitSide {
    Left,
    Right,
}

pub fn new_section_id() -> String {
    format!("section-{}", Uuid::new_v4())
}

fn placeholder_section(order: u32) -> Section {
    Section::new(
        new_section_id(),
        SectionType::Section,
        Some(PLACEHOLDER_TITLE),
        SectionContent::from(PLACEHOLDER_CONTENT),
        order,
    )
}

fn index_of(layout: &[Section], id: &str) -> Result<usize, LayoutError> {
    layout
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| LayoutError::SectionNotFound(id.to_string()))
}

fn ensure_row_intact(layout: &[Section], row: RowId) -> Result<(), LayoutError> {
    let violations = check_row(layout, row);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LayoutError::InvariantViolation(format!(
            "row {row} is malformed: {violations:?}"
        )))
    }
}

/// Assigns `order = position` to every section of every entry.
fn renumber(layout: &mut [Section], entries: &[Entry]) {
    for (position, entry) in entries.iter().enumerate() {
        for section in layout.iter_mut().filter(|s| entry.contains(s)) {
            section.order = position as u32;
        }
    }
}

fn normalize_orders(layout: &mut [Section]) {
    let entries = top_level_entries(layout);
    renumber(layout, &entries);
}

/// Restores dense columns and the no-singleton rule for `row` after one of its members left.
///
/// One survivor reverts to standalone and keeps the row's order. Several
/// survivors are re-indexed densely in their previous column order.
fn rebalance_row(layout: &mut [Section], row: RowId) {
    let mut members: Vec<usize> = layout
        .iter()
        .enumerate()
        .filter(|(_, s)| s.row == Some(row))
        .map(|(i, _)| i)
        .collect();
    members.sort_by_key(|&i| layout[i].column.unwrap_or(0));

    match members.len() {
        0 => {}
        1 => {
            debug!("Row {row} collapsed to standalone '{}'", layout[members[0]].id);
            layout[members[0]].clear_placement();
        }
        count => {
            for (column, &i) in members.iter().enumerate() {
                layout[i].column = Some(column as u32);
                layout[i].columns_in_row = Some(count as u32);
            }
        }
    }
}

/// Picks the id for a new row.
///
/// The anchor's current order is used when no live row holds that number,
/// which keeps ids readable; otherwise the next id above every live row, or
/// the smallest free id once the top of the range is taken.
fn allocate_row_id(layout: &[Section], preferred: RowId) -> RowId {
    let in_use = |id: RowId| layout.iter().any(|s| s.row == Some(id));
    if !in_use(preferred) {
        return preferred;
    }
    layout
        .iter()
        .filter_map(|s| s.row)
        .max()
        .and_then(|max| max.checked_add(1))
        .or_else(|| (0..=RowId::MAX).find(|&id| !in_use(id)))
        .unwrap_or(preferred)
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Inserts a blank standalone section at top-level position `at` (end when `None`).
///
/// Fails with `LimitReached` when the layout already holds the maximum number
/// of top-level entries for `project_type`.
pub fn insert_section(
    layout: &[Section],
    at: Option<usize>,
    project_type: ProjectType,
) -> Result<Vec<Section>, LayoutError> {
    let mut entries = top_level_entries(layout);
    let max = project_type.max_sections();
    if entries.len() >= max {
        debug!("Insert rejected: {} layout already has {max} entries", project_type);
        return Err(LayoutError::LimitReached { project_type, max });
    }

    let section = placeholder_section(0);
    let position = at.map_or(entries.len(), |p| p.min(entries.len()));
    entries.insert(position, Entry::Standalone(section.id.clone()));
    debug!("Inserting section '{}' at position {position}", section.id);

    let mut next = layout.to_vec();
    next.push(section);
    renumber(&mut next, &entries);
    Ok(next)
}

/// Adds a new column next to `target_id` (horizontal drop).
///
/// A standalone target becomes a two-column row. A target already in a row
/// gets the new column directly beside it: at its column for `Left`, just
/// after it for `Right`, with later columns shifted right. A row occupies a
/// single top-level slot, so this never consults the section cap.
pub fn split_into_columns(
    layout: &[Section],
    target_id: &str,
    side: SplitSide,
) -> Result<Vec<Section>, LayoutError> {
    let target_index = index_of(layout, target_id)?;
    let target = &layout[target_index];
    let mut next = layout.to_vec();
    let mut section = placeholder_section(target.order);

    match target.row {
        None => {
            let row = allocate_row_id(layout, target.order);
            let (target_column, new_column) = match side {
                SplitSide::Left => (1, 0),
                SplitSide::Right => (0, 1),
            };
            next[target_index].place(row, target_column, 2);
            section.place(row, new_column, 2);
            debug!("Split '{target_id}' into new row {row}");
        }
        Some(row) => {
            ensure_row_intact(layout, row)?;
            let target_column = target.column.unwrap_or(0);
            let insert_at = match side {
                SplitSide::Left => target_column,
                SplitSide::Right => target_column + 1,
            };
            let count = row_members(layout, row).len() as u32 + 1;

            for member in next.iter_mut().filter(|s| s.row == Some(row)) {
                let column = member.column.unwrap_or(0);
                if column >= insert_at {
                    member.column = Some(column + 1);
                }
                member.columns_in_row = Some(count);
            }
            section.place(row, insert_at, count);
            debug!("Row {row} widened to {count} columns (new column {insert_at})");
        }
    }

    next.push(section);
    normalize_orders(&mut next);
    Ok(next)
}

/// Moves `moved_id` to the top-level position of `target_id` (vertical drag).
///
/// Uses array-move semantics: moving up lands before the target, moving down
/// lands after it. A row member dragged vertically leaves its row, which is
/// then rebalanced exactly as after a delete. Two members of the same row are
/// reordered horizontally instead.
///
/// Leaving a row adds a top-level entry, so that case is refused with
/// `LimitReached` when the layout is already at the cap for `project_type`.
pub fn reorder_vertical(
    layout: &[Section],
    moved_id: &str,
    target_id: &str,
    project_type: ProjectType,
) -> Result<Vec<Section>, LayoutError> {
    let moved_index = index_of(layout, moved_id)?;
    let target_index = index_of(layout, target_id)?;
    if moved_index == target_index {
        return Ok(layout.to_vec());
    }

    let moved = &layout[moved_index];
    let target = &layout[target_index];
    if moved.row.is_some() && moved.row == target.row {
        return reorder_horizontal(layout, moved_id, target_id);
    }

    let mut entries = top_level_entries(layout);
    let from = position_of(&entries, &Entry::of(moved))?;
    let to = position_of(&entries, &Entry::of(target))?;
    let mut next = layout.to_vec();

    match moved.row {
        None => {
            let entry = entries.remove(from);
            entries.insert(to, entry);
        }
        Some(row) => {
            ensure_row_intact(layout, row)?;
            let max = project_type.max_sections();
            if entries.len() >= max {
                debug!("Pull-out of '{moved_id}' rejected: {project_type} layout already has {max} entries");
                return Err(LayoutError::LimitReached { project_type, max });
            }
            let survivors: Vec<&Section> = layout
                .iter()
                .filter(|s| s.row == Some(row) && s.id != moved_id)
                .collect();
            entries[from] = match survivors.as_slice() {
                [only] => Entry::Standalone(only.id.clone()),
                _ => Entry::Row(row),
            };

            next[moved_index].clear_placement();
            rebalance_row(&mut next, row);

            let insert_at = if from < to { to + 1 } else { to };
            entries.insert(insert_at, Entry::Standalone(moved_id.to_string()));
            debug!("Section '{moved_id}' pulled out of row {row}");
        }
    }

    renumber(&mut next, &entries);
    Ok(next)
}

/// Reorders columns inside one row (horizontal drag), then re-indexes them densely.
pub fn reorder_horizontal(
    layout: &[Section],
    moved_id: &str,
    target_id: &str,
) -> Result<Vec<Section>, LayoutError> {
    let moved = &layout[index_of(layout, moved_id)?];
    let target = &layout[index_of(layout, target_id)?];

    let row = match (moved.row, target.row) {
        (Some(a), Some(b)) if a == b => a,
        _ => {
            return Err(LayoutError::NotSameRow {
                moved: moved_id.to_string(),
                target: target_id.to_string(),
            })
        }
    };
    ensure_row_intact(layout, row)?;

    let mut ids: Vec<String> = row_members(layout, row)
        .iter()
        .map(|s| s.id.clone())
        .collect();
    let from = ids.iter().position(|id| id == moved_id).unwrap_or(0);
    let to = ids.iter().position(|id| id == target_id).unwrap_or(0);
    let id = ids.remove(from);
    ids.insert(to, id);

    let count = ids.len() as u32;
    let mut next = layout.to_vec();
    for (column, id) in ids.iter().enumerate() {
        if let Some(member) = next.iter_mut().find(|s| &s.id == id) {
            member.column = Some(column as u32);
            member.columns_in_row = Some(count);
        }
    }
    debug!("Row {row} reordered: {ids:?}");

    normalize_orders(&mut next);
    Ok(next)
}

/// Removes a section, rebalancing the row it leaves behind.
pub fn delete_section(layout: &[Section], id: &str) -> Result<Vec<Section>, LayoutError> {
    let index = index_of(layout, id)?;
    let mut next = layout.to_vec();
    let removed = next.remove(index);

    if let Some(row) = removed.row {
        rebalance_row(&mut next, row);
    }
    debug!("Deleted section '{id}'");

    normalize_orders(&mut next);
    Ok(next)
}

/// Replaces a section's title and content. Positional fields are untouched.
///
/// The caller shapes `content` for the section's type (see `SectionContent::coerce`).
pub fn update_section_content(
    layout: &[Section],
    id: &str,
    title: Option<String>,
    content: SectionContent,
) -> Result<Vec<Section>, LayoutError> {
    let index = index_of(layout, id)?;
    let mut next = layout.to_vec();
    next[index].title = title;
    next[index].content = content;
    Ok(next)
}

fn position_of(entries: &[Entry], entry: &Entry) -> Result<usize, LayoutError> {
    entries.iter().position(|e| e == entry).ok_or_else(|| {
        LayoutError::InvariantViolation(format!("entry {entry:?} missing from layout"))
    })
}
