//! Boundary checks for AI output.
//!
//! A generated layout is accepted whole or not at all. Every entry needs a
//! non-empty string `id`, a known `type`, and content that can be read as a
//! string or a list of strings. Object-shaped content is flattened to text
//! here so it never reaches the engine.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::assist::{AssistError, RewrittenSection};
use crate::layout::model::{ProjectType, Section, SectionContent, SectionType};

/// Validates, normalizes and truncates an AI-generated layout.
///
/// Row placement is discarded (generated layouts are single-column), orders
/// follow array position, and entries beyond the type's cap are dropped in
/// stable order.
pub fn accept_generated_layout(
    raw: Vec<Value>,
    project_type: ProjectType,
) -> Result<Vec<Section>, AssistError> {
    if raw.is_empty() {
        return Err(AssistError::MalformedLayout(
            "generated layout has no sections".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let section = section_from_value(index, value)
            .map_err(|reason| AssistError::MalformedLayout(format!("entry {index}: {reason}")))?;
        if !seen.insert(section.id.clone()) {
            return Err(AssistError::MalformedLayout(format!(
                "entry {index}: duplicate id '{}'",
                section.id
            )));
        }
        sections.push(section);
    }

    let max = project_type.max_sections();
    if sections.len() > max {
        warn!(
            "AI generated {} sections, limiting to {max} for a one-page {project_type}",
            sections.len()
        );
        sections.truncate(max);
    }
    Ok(sections)
}

fn section_from_value(index: usize, value: &Value) -> Result<Section, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "section is not an object".to_string())?;

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        _ => return Err("missing id".to_string()),
    };

    let section_type = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(SectionType::parse)
        .ok_or_else(|| format!("unknown type {:?}", object.get("type")))?;

    let content = normalize_content(section_type, object.get("content"))?;

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let mut section = Section::new(id, section_type, title, content, index as u32);
    section.url = object
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(section)
}

/// Reads model content into the shape the section type expects.
fn normalize_content(
    section_type: SectionType,
    value: Option<&Value>,
) -> Result<SectionContent, String> {
    let content = match value {
        None | Some(Value::Null) => SectionContent::default(),
        Some(Value::String(text)) => SectionContent::Text(text.clone()),
        Some(Value::Array(items)) => SectionContent::List(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| scalar_to_string(item).ok_or("list item is not a scalar"))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(Value::Object(fields)) => SectionContent::Text(flatten_object(section_type, fields)?),
        Some(scalar) => {
            SectionContent::Text(scalar_to_string(scalar).ok_or("content is not a scalar")?)
        }
    };

    Ok(match (section_type.is_list(), content) {
        (true, SectionContent::Text(text)) => SectionContent::List(
            SectionContent::Text(text).items(),
        ),
        (false, SectionContent::List(items)) => SectionContent::Text(items.join("\n")),
        (_, content) => content,
    })
}

/// Contact objects become `key: value` lines; any other object joins its values.
fn flatten_object(section_type: SectionType, fields: &Map<String, Value>) -> Result<String, String> {
    let mut parts = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let value = scalar_to_string(value).ok_or_else(|| format!("field '{key}' is nested"))?;
        parts.push(match section_type {
            SectionType::Contact => format!("{key}: {value}"),
            _ => value,
        });
    }
    Ok(match section_type {
        SectionType::Contact => parts.join("\n"),
        _ => parts.join(", "),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RewriteReply {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<Value>,
}

/// Turns a model rewrite reply into a title/content pair.
///
/// A reply that is not JSON is taken as the new content. A null, blank or
/// unchanged title keeps the original; blank content keeps the original.
pub fn sanitize_rewrite(
    reply: &str,
    original_title: Option<&str>,
    original_content: &str,
) -> RewrittenSection {
    let reply = reply.trim();
    let parsed: RewriteReply = match serde_json::from_str(reply) {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Rewrite reply was not JSON; using it as plain content");
            return RewrittenSection {
                title: original_title.map(str::to_string),
                content: if reply.is_empty() {
                    original_content.to_string()
                } else {
                    reply.to_string()
                },
            };
        }
    };

    let title = match parsed.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => original_title.map(str::to_string),
    };

    let content = match parsed.content {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        _ => original_content.to_string(),
    };

    RewrittenSection { title, content }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generated(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"id": format!("s{i}"), "type": "text", "content": format!("body {i}")}))
            .collect()
    }

    #[test]
    fn test_cover_letter_truncated_to_six_in_order() {
        let sections = accept_generated_layout(generated(10), ProjectType::CoverLetter).unwrap();
        assert_eq!(sections.len(), 6);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s0", "s1", "s2", "s3", "s4", "s5"]);
        assert!(sections.iter().enumerate().all(|(i, s)| s.order == i as u32));
    }

    #[test]
    fn test_missing_id_rejects_whole_batch() {
        let mut raw = generated(3);
        raw.push(json!({"type": "text", "content": "x"}));
        assert!(matches!(
            accept_generated_layout(raw, ProjectType::Resume),
            Err(AssistError::MalformedLayout(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let raw = vec![json!({"id": "a", "type": "table", "content": "x"})];
        assert!(accept_generated_layout(raw, ProjectType::Resume).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let raw = vec![
            json!({"id": "a", "type": "text", "content": "x"}),
            json!({"id": "a", "type": "text", "content": "y"}),
        ];
        assert!(accept_generated_layout(raw, ProjectType::Resume).is_err());
    }

    #[test]
    fn test_empty_layout_rejected() {
        assert!(accept_generated_layout(vec![], ProjectType::Resume).is_err());
    }

    #[test]
    fn test_nested_content_rejected() {
        let raw = vec![json!({"id": "a", "type": "text", "content": {"x": {"y": 1}}})];
        assert!(accept_generated_layout(raw, ProjectType::Resume).is_err());
    }

    #[test]
    fn test_contact_object_flattened_to_lines() {
        let raw = vec![json!({
            "id": "c",
            "type": "contact",
            "content": {"Email": "jo@example.com", "Phone": "555"}
        })];
        let sections = accept_generated_layout(raw, ProjectType::Resume).unwrap();
        assert_eq!(
            sections[0].content,
            SectionContent::Text("Email: jo@example.com\nPhone: 555".into())
        );
    }

    #[test]
    fn test_skills_text_becomes_list_and_numbers_stringified() {
        let raw = vec![
            json!({"id": "s", "type": "skills", "content": "Rust, SQL"}),
            json!({"id": "t", "type": "skills", "content": ["Go", 42, null]}),
        ];
        let sections = accept_generated_layout(raw, ProjectType::Resume).unwrap();
        assert_eq!(
            sections[0].content,
            SectionContent::List(vec!["Rust".into(), "SQL".into()])
        );
        assert_eq!(
            sections[1].content,
            SectionContent::List(vec!["Go".into(), "42".into()])
        );
    }

    #[test]
    fn test_row_fields_are_dropped() {
        let raw = vec![
            json!({"id": "a", "type": "text", "content": "x", "row": 0, "column": 1, "columnsInRow": 2, "order": 9}),
            json!({"id": "b", "type": "text"}),
        ];
        let sections = accept_generated_layout(raw, ProjectType::Resume).unwrap();
        assert!(sections.iter().all(|s| s.is_standalone()));
        assert_eq!(sections[0].order, 0);
        assert_eq!(sections[1].content, SectionContent::Text(String::new()));
    }

    #[test]
    fn test_rewrite_plain_text_reply_becomes_content() {
        let r = sanitize_rewrite("Led a team of 5", Some("Experience"), "old");
        assert_eq!(r.title.as_deref(), Some("Experience"));
        assert_eq!(r.content, "Led a team of 5");
    }

    #[test]
    fn test_rewrite_null_title_keeps_original() {
        let r = sanitize_rewrite(r#"{"title": null, "content": "new"}"#, Some("Skills"), "old");
        assert_eq!(r.title.as_deref(), Some("Skills"));
        assert_eq!(r.content, "new");
    }

    #[test]
    fn test_rewrite_empty_content_keeps_original() {
        let r = sanitize_rewrite(r#"{"title": "Summary", "content": ""}"#, None, "old");
        assert_eq!(r.title.as_deref(), Some("Summary"));
        assert_eq!(r.content, "old");
    }

    #[test]
    fn test_rewrite_list_content_joined() {
        let r = sanitize_rewrite(r#"{"content": ["Rust", "Go"]}"#, None, "");
        assert_eq!(r.content, "Rust, Go");
    }
}
