//! Invariant checks over a layout.
//!
//! Not on the hot path: the engine preserves these by construction. Used by
//! tests, by the AI boundary before a generated layout is accepted, and by the
//! engine to refuse edits on a row that is already malformed.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::layout::model::{RowId, Section};
use crate::layout::rows::top_level_entries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DuplicateId { id: String },
    RowWithoutColumn { id: String },
    ColumnWithoutRow { id: String },
    /// A column index is used twice.
    DuplicateColumn { row: RowId, column: u32 },
    /// Columns are not `0..n`.
    ColumnGap { row: RowId, columns: Vec<u32> },
    /// A member's `columns_in_row` disagrees with the member count.
    ColumnsInRowMismatch {
        row: RowId,
        id: String,
        declared: Option<u32>,
        actual: u32,
    },
    SingleMemberRow { row: RowId, id: String },
    /// Members of one row sit at different vertical positions.
    RowOrderMismatch { row: RowId },
}

/// Reports every invariant violation in `layout`.
pub fn validate(layout: &[Section]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    for section in layout {
        if !seen.insert(section.id.as_str()) {
            violations.push(Violation::DuplicateId {
                id: section.id.clone(),
            });
        }
        match (section.row, section.column) {
            (Some(_), None) => violations.push(Violation::RowWithoutColumn {
                id: section.id.clone(),
            }),
            (None, Some(_)) => violations.push(Violation::ColumnWithoutRow {
                id: section.id.clone(),
            }),
            _ => {}
        }
    }

    let mut rows: BTreeMap<RowId, Vec<&Section>> = BTreeMap::new();
    for section in layout {
        if let Some(row) = section.row {
            rows.entry(row).or_default().push(section);
        }
    }

    for (row, members) in rows {
        violations.extend(check_row_members(row, &members));
    }

    violations
}

/// Checks the column shape of a single row.
pub fn check_row(layout: &[Section], row: RowId) -> Vec<Violation> {
    let members: Vec<&Section> = layout.iter().filter(|s| s.row == Some(row)).collect();
    if members.is_empty() {
        return Vec::new();
    }
    check_row_members(row, &members)
}

fn check_row_members(row: RowId, members: &[&Section]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let actual = members.len() as u32;

    if members.len() == 1 {
        violations.push(Violation::SingleMemberRow {
            row,
            id: members[0].id.clone(),
        });
    }

    let mut columns = BTreeSet::new();
    for member in members {
        if let Some(column) = member.column {
            if !columns.insert(column) {
                violations.push(Violation::DuplicateColumn { row, column });
            }
        }
        if member.columns_in_row != Some(actual) {
            violations.push(Violation::ColumnsInRowMismatch {
                row,
                id: member.id.clone(),
                declared: member.columns_in_row,
                actual,
            });
        }
    }

    let dense = columns.len() == members.len() && columns.iter().copied().eq(0..actual);
    if !dense {
        violations.push(Violation::ColumnGap {
            row,
            columns: columns.into_iter().collect(),
        });
    }

    if members.iter().any(|m| m.order != members[0].order) {
        violations.push(Violation::RowOrderMismatch { row });
    }

    violations
}

pub fn is_valid(layout: &[Section]) -> bool {
    validate(layout).is_empty()
}

/// True when the top-level entries carry exactly the orders `0..n`.
pub fn orders_are_dense(layout: &[Section]) -> bool {
    top_level_entries(layout)
        .iter()
        .enumerate()
        .all(|(position, entry)| {
            layout
                .iter()
                .filter(|s| entry.contains(s))
                .all(|s| s.order as usize == position)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{SectionContent, SectionType};

    fn section(id: &str, order: u32) -> Section {
        Section::new(id, SectionType::Text, None, SectionContent::from("x"), order)
    }

    fn member(id: &str, order: u32, row: RowId, column: u32, columns: u32) -> Section {
        let mut s = section(id, order);
        s.place(row, column, columns);
        s
    }

    #[test]
    fn test_valid_layout_has_no_violations() {
        let layout = vec![
            section("a", 0),
            member("b", 1, 1, 0, 2),
            member("c", 1, 1, 1, 2),
            section("d", 2),
        ];
        assert!(validate(&layout).is_empty());
        assert!(orders_are_dense(&layout));
    }

    #[test]
    fn test_duplicate_id_detected() {
        let layout = vec![section("a", 0), section("a", 1)];
        assert_eq!(
            validate(&layout),
            vec![Violation::DuplicateId { id: "a".into() }]
        );
    }

    #[test]
    fn test_row_column_pairing_detected() {
        let mut orphan_row = section("a", 0);
        orphan_row.row = Some(3);
        let mut orphan_column = section("b", 1);
        orphan_column.column = Some(0);
        let violations = validate(&[orphan_row, orphan_column]);
        assert!(violations.contains(&Violation::RowWithoutColumn { id: "a".into() }));
        assert!(violations.contains(&Violation::ColumnWithoutRow { id: "b".into() }));
    }

    #[test]
    fn test_column_gap_detected() {
        let layout = vec![member("a", 0, 0, 0, 2), member("b", 0, 0, 2, 2)];
        let violations = validate(&layout);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::ColumnGap { row: 0, .. })));
    }

    #[test]
    fn test_duplicate_column_and_count_mismatch_detected() {
        let layout = vec![member("a", 0, 0, 0, 3), member("b", 0, 0, 0, 2)];
        let violations = validate(&layout);
        assert!(violations.contains(&Violation::DuplicateColumn { row: 0, column: 0 }));
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::ColumnsInRowMismatch { id, declared: Some(3), actual: 2, .. } if id == "a"
        )));
    }

    #[test]
    fn test_single_member_row_detected() {
        let layout = vec![member("a", 0, 5, 0, 1)];
        assert!(validate(&layout).contains(&Violation::SingleMemberRow {
            row: 5,
            id: "a".into()
        }));
    }

    #[test]
    fn test_row_order_mismatch_detected() {
        let layout = vec![member("a", 0, 1, 0, 2), member("b", 3, 1, 1, 2)];
        assert!(validate(&layout).contains(&Violation::RowOrderMismatch { row: 1 }));
    }

    #[test]
    fn test_orders_not_dense() {
        let layout = vec![section("a", 0), section("b", 2)];
        assert!(!orders_are_dense(&layout));
    }

    #[test]
    fn test_check_row_ignores_other_rows() {
        let layout = vec![
            member("a", 0, 1, 0, 2),
            member("b", 0, 1, 1, 2),
            member("c", 1, 2, 0, 1),
        ];
        assert!(check_row(&layout, 1).is_empty());
        assert_eq!(check_row(&layout, 2).len(), 1);
        assert!(check_row(&layout, 9).is_empty());
    }
}
