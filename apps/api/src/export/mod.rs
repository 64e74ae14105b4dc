//! Printable HTML export.
//!
//! Renders a project the way the editor shows it: top to bottom by row, left
//! to right by column. The browser's print dialog turns the page into a PDF.

use std::fmt::Write;

use crate::layout::{organize_into_rows, Project, Section, SectionContent, SectionType};

const STYLES: &str = "\
body { font-family: Inter, Arial, sans-serif; color: #1f2937; margin: 0; }
.page { width: 8.5in; min-height: 11in; margin: 0 auto; padding: 0.75in; box-sizing: border-box; }
.row { display: flex; gap: 1.5rem; }
.section { margin-bottom: 1rem; }
.header { text-align: center; }
.header h1 { font-size: 2rem; margin: 0; }
.header p { color: #4b5563; margin: 0.25rem 0 0; }
h2 { font-size: 1rem; text-transform: uppercase; border-bottom: 1px solid #d1d5db; padding-bottom: 0.25rem; }
.content { white-space: pre-wrap; }
.tags { display: flex; flex-wrap: wrap; gap: 0.5rem; }
.tag { background: #eef2ff; border-radius: 9999px; padding: 0.125rem 0.75rem; font-size: 0.875rem; }
.photo img { max-width: 100%; border-radius: 50%; }
@media print { .page { margin: 0; } }";

pub fn render_html(project: &Project) -> String {
    let mut body = String::new();
    for members in organize_into_rows(&project.layout).values() {
        match members.as_slice() {
            [single] if single.is_standalone() => render_section(&mut body, single),
            members => {
                body.push_str("<div class=\"row\">");
                for member in members {
                    let columns = member.columns_in_row.unwrap_or(members.len() as u32).max(1);
                    let _ = write!(
                        body,
                        "<div class=\"column\" style=\"width: {:.4}%\">",
                        100.0 / columns as f64
                    );
                    render_section(&mut body, member);
                    body.push_str("</div>");
                }
                body.push_str("</div>");
            }
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{STYLES}\n</style>\n</head>\n<body>\n<div class=\"page\">{body}</div>\n</body>\n</html>\n",
        escape(&project.title)
    )
}

fn render_section(out: &mut String, section: &Section) {
    let title = section.title.as_deref().unwrap_or_default();
    match section.section_type {
        SectionType::Header => {
            let _ = write!(
                out,
                "<header class=\"section header\"><h1>{}</h1><p>{}</p></header>",
                escape(title),
                escape(&section.content.as_display())
            );
        }
        SectionType::Photo => {
            out.push_str("<div class=\"section photo\">");
            if let Some(url) = section.url.as_deref() {
                let _ = write!(out, "<img src=\"{}\" alt=\"{}\">", escape(url), escape(title));
            }
            out.push_str("</div>");
        }
        _ => {
            out.push_str("<section class=\"section\">");
            if !title.is_empty() {
                let _ = write!(out, "<h2>{}</h2>", escape(title));
            }
            match &section.content {
                content if content.is_blank() => {}
                SectionContent::List(items) => {
                    out.push_str("<div class=\"tags\">");
                    for item in items {
                        let _ = write!(out, "<span class=\"tag\">{}</span>", escape(item));
                    }
                    out.push_str("</div>");
                }
                SectionContent::Text(text) => {
                    let _ = write!(out, "<div class=\"content\">{}</div>", escape(text));
                }
            }
            out.push_str("</section>");
        }
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ProjectType;
    use chrono::Utc;
    use uuid::Uuid;

    fn project(layout: Vec<Section>) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "CV <draft>".into(),
            project_type: ProjectType::Resume,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            layout,
        }
    }

    #[test]
    fn test_escapes_user_text() {
        let html = render_html(&project(vec![Section::new(
            "s",
            SectionType::Section,
            Some("A & B"),
            "<script>alert(1)</script>".into(),
            0,
        )]));
        assert!(html.contains("<title>CV &lt;draft&gt;</title>"));
        assert!(html.contains("A &amp; B"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_skills_render_as_tags() {
        let html = render_html(&project(vec![Section::new(
            "skills",
            SectionType::Skills,
            Some("Skills"),
            vec!["Rust".to_string(), "SQL".to_string()].into(),
            0,
        )]));
        assert!(html.contains("<span class=\"tag\">Rust</span><span class=\"tag\">SQL</span>"));
    }

    #[test]
    fn test_rows_render_in_column_order_with_widths() {
        let mut left = Section::new("left", SectionType::Section, Some("L"), "l".into(), 1);
        let mut right = Section::new("right", SectionType::Section, Some("R"), "r".into(), 1);
        left.place(1, 0, 2);
        right.place(1, 1, 2);
        let header = Section::new("h", SectionType::Header, Some("Jane"), "Dev".into(), 0);

        let html = render_html(&project(vec![right, header, left]));
        let h = html.find("<h1>Jane</h1>").unwrap();
        let l = html.find("<h2>L</h2>").unwrap();
        let r = html.find("<h2>R</h2>").unwrap();
        assert!(h < l && l < r);
        assert_eq!(html.matches("width: 50.0000%").count(), 2);
    }
}
