//! Layout Model: the section records a document is built from.
//!
//! A layout is an unordered bag of `Section`s. Vertical position comes from
//! `order`; multi-column placement comes from `row` / `column` / `columns_in_row`.
//!
//! # Invariants
//! - Section ids are unique within a layout.
//! - `row` and `column` are set or cleared together.
//! - The columns of a row are exactly `0..columns_in_row`.
//! - A row never has a single member.
//! - Every member of a row carries the row's top-level `order`.
//!
//! Row ids are identifiers, not positions: once assigned they never change,
//! while `order` is renumbered after every structural edit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a multi-column row. Distinct from the row's top-level `order`.
pub type RowId = u32;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

/// What a section holds. Governs rendering and content coercion, never arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Header,
    Contact,
    Photo,
    Section,
    Text,
    Skills,
    Experience,
    Education,
}

impl SectionType {
    pub const ALL: [SectionType; 8] = [
        SectionType::Header,
        SectionType::Contact,
        SectionType::Photo,
        SectionType::Section,
        SectionType::Text,
        SectionType::Skills,
        SectionType::Experience,
        SectionType::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Header => "header",
            SectionType::Contact => "contact",
            SectionType::Photo => "photo",
            SectionType::Section => "section",
            SectionType::Text => "text",
            SectionType::Skills => "skills",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
        }
    }

    pub fn parse(raw: &str) -> Option<SectionType> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    /// Skills are stored as a list; everything else as a single string.
    pub fn is_list(&self) -> bool {
        matches!(self, SectionType::Skills)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document kind. Decides the one-page section cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Resume,
    CoverLetter,
}

impl ProjectType {
    /// Maximum number of top-level entries that still fits on one page.
    pub fn max_sections(&self) -> usize {
        match self {
            ProjectType::Resume => 8,
            ProjectType::CoverLetter => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Resume => "resume",
            ProjectType::CoverLetter => "cover-letter",
        }
    }

    pub fn parse(raw: &str) -> Option<ProjectType> {
        match raw {
            "resume" => Some(ProjectType::Resume),
            "cover-letter" => Some(ProjectType::CoverLetter),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content
// ────────────────────────────────────────────────────────────────────────────

/// Section body: a single string, or an ordered list for list-shaped sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    Text(String),
    List(Vec<String>),
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::Text(String::new())
    }
}

impl SectionContent {
    /// Builds content from editor input, shaped by the section's type.
    ///
    /// Skills split on commas (trimmed, empties dropped); all others are trimmed text.
    pub fn coerce(section_type: SectionType, raw: &str) -> SectionContent {
        if section_type.is_list() {
            SectionContent::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            SectionContent::Text(raw.trim().to_string())
        }
    }

    /// Flat string form used by the editor text box and exports.
    pub fn as_display(&self) -> String {
        match self {
            SectionContent::Text(text) => text.clone(),
            SectionContent::List(items) => items.join(", "),
        }
    }

    /// List form; text content is split on commas the way skills are entered.
    pub fn items(&self) -> Vec<String> {
        match self {
            SectionContent::List(items) => items.clone(),
            SectionContent::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SectionContent::Text(text) => text.trim().is_empty(),
            SectionContent::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }
}

impl From<&str> for SectionContent {
    fn from(value: &str) -> Self {
        SectionContent::Text(value.to_string())
    }
}

impl From<Vec<String>> for SectionContent {
    fn from(value: Vec<String>) -> Self {
        SectionContent::List(value)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section / Project
// ────────────────────────────────────────────────────────────────────────────

/// The atomic layout unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: SectionContent,
    /// Image link for photo sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<RowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_in_row: Option<u32>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        section_type: SectionType,
        title: Option<&str>,
        content: SectionContent,
        order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            section_type,
            title: title.map(str::to_string),
            content,
            url: None,
            order,
            row: None,
            column: None,
            columns_in_row: None,
        }
    }

    /// Full-width section with no row membership.
    pub fn is_standalone(&self) -> bool {
        self.row.is_none()
    }

    /// Places the section into a row slot.
    pub fn place(&mut self, row: RowId, column: u32, columns_in_row: u32) {
        self.row = Some(row);
        self.column = Some(column);
        self.columns_in_row = Some(columns_in_row);
    }

    /// Reverts the section to standalone, full width.
    pub fn clear_placement(&mut self) {
        self.row = None;
        self.column = None;
        self.columns_in_row = None;
    }
}

/// A named document owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub layout: Vec<Section>,
}
