//! Derived, read-only views over a layout.
//!
//! The editor and the exporter render `organize_into_rows` top to bottom,
//! left to right. The engine works on `top_level_entries`, where a standalone
//! section and a whole multi-column row each occupy one slot.

use std::collections::{BTreeMap, HashMap};

use crate::layout::model::{RowId, Section};

/// One slot on the vertical axis of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    Standalone(String),
    Row(RowId),
}

impl Entry {
    pub fn of(section: &Section) -> Entry {
        match section.row {
            Some(row) => Entry::Row(row),
            None => Entry::Standalone(section.id.clone()),
        }
    }

    /// True when `section` belongs to this slot.
    pub fn contains(&self, section: &Section) -> bool {
        match self {
            Entry::Standalone(id) => section.row.is_none() && &section.id == id,
            Entry::Row(row) => section.row == Some(*row),
        }
    }
}

/// All standalone sections, ascending by `order`.
pub fn sorted_standalone(layout: &[Section]) -> Vec<&Section> {
    let mut standalone: Vec<&Section> = layout.iter().filter(|s| s.is_standalone()).collect();
    standalone.sort_by_key(|s| s.order);
    standalone
}

/// Top-level slots sorted by position.
///
/// A row is positioned by the smallest `order` among its members; ties keep
/// the order in which the slots first appear in `layout`.
pub fn top_level_entries(layout: &[Section]) -> Vec<Entry> {
    let mut positions: HashMap<Entry, (u32, usize)> = HashMap::new();
    let mut slots: Vec<Entry> = Vec::new();

    for (index, section) in layout.iter().enumerate() {
        let entry = Entry::of(section);
        match positions.get_mut(&entry) {
            Some((order, _)) => *order = (*order).min(section.order),
            None => {
                positions.insert(entry.clone(), (section.order, index));
                slots.push(entry);
            }
        }
    }

    slots.sort_by_key(|entry| positions[entry]);
    slots
}

/// Number of top-level entries; a multi-column row counts once.
pub fn top_level_count(layout: &[Section]) -> usize {
    top_level_entries(layout).len()
}

/// Members of a row, ascending by column.
pub fn row_members(layout: &[Section], row: RowId) -> Vec<&Section> {
    let mut members: Vec<&Section> = layout.iter().filter(|s| s.row == Some(row)).collect();
    members.sort_by_key(|s| s.column.unwrap_or(0));
    members
}

/// Groups the layout into rendered rows, keyed by top-level position.
///
/// Standalone sections form a single-member row with an implicit column 0.
/// Members of a multi-column row are sorted by `column`.
pub fn organize_into_rows(layout: &[Section]) -> BTreeMap<usize, Vec<&Section>> {
    top_level_entries(layout)
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            let mut members: Vec<&Section> =
                layout.iter().filter(|s| entry.contains(s)).collect();
            members.sort_by_key(|s| s.column.unwrap_or(0));
            (position, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{SectionContent, SectionType};

    fn section(id: &str, order: u32) -> Section {
        Section::new(id, SectionType::Section, Some(id), SectionContent::from(id), order)
    }

    fn member(id: &str, order: u32, row: RowId, column: u32, columns: u32) -> Section {
        let mut s = section(id, order);
        s.place(row, column, columns);
        s
    }

    #[test]
    fn test_sorted_standalone_skips_row_members() {
        let layout = vec![
            section("c", 2),
            member("b1", 1, 7, 1, 2),
            section("a", 0),
            member("b0", 1, 7, 0, 2),
        ];
        let ids: Vec<&str> = sorted_standalone(&layout).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_top_level_counts_row_once() {
        let layout = vec![
            section("a", 0),
            member("b0", 1, 1, 0, 3),
            member("b1", 1, 1, 1, 3),
            member("b2", 1, 1, 2, 3),
            section("c", 2),
        ];
        assert_eq!(top_level_count(&layout), 3);
        assert_eq!(
            top_level_entries(&layout),
            vec![
                Entry::Standalone("a".into()),
                Entry::Row(1),
                Entry::Standalone("c".into())
            ]
        );
    }

    #[test]
    fn test_row_id_does_not_collide_with_standalone_order() {
        // Row 0 sits at position 1 while standalone "a" has order 0.
        let layout = vec![
            section("a", 0),
            member("r0", 1, 0, 0, 2),
            member("r1", 1, 0, 1, 2),
        ];
        let rows = organize_into_rows(&layout);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[&0].len(), 1);
        assert_eq!(rows[&1].len(), 2);
    }

    #[test]
    fn test_organize_sorts_columns_left_to_right() {
        let layout = vec![
            member("right", 0, 3, 1, 2),
            member("left", 0, 3, 0, 2),
            section("below", 1),
        ];
        let rows = organize_into_rows(&layout);
        let first: Vec<&str> = rows[&0].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(first, vec!["left", "right"]);
        assert_eq!(rows[&1][0].id, "below");
    }

    #[test]
    fn test_rows_flatten_back_to_the_same_sections() {
        let layout = vec![
            section("c", 2),
            member("b1", 1, 1, 1, 2),
            section("a", 0),
            member("b0", 1, 1, 0, 2),
        ];
        let mut flat: Vec<Section> = organize_into_rows(&layout)
            .into_values()
            .flatten()
            .cloned()
            .collect();
        let mut original = layout.clone();
        let key = |s: &Section| (s.order, s.row, s.column);
        flat.sort_by_key(key);
        original.sort_by_key(key);
        assert_eq!(flat, original);
    }

    #[test]
    fn test_empty_layout() {
        assert!(organize_into_rows(&[]).is_empty());
        assert_eq!(top_level_count(&[]), 0);
    }
}
