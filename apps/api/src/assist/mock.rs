//! Offline content assistant, used when no API key is configured.
//!
//! Returns fixed one-page sample layouts and deterministic rewrites so the
//! editor stays usable in demo mode and in tests.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::assist::{AssistError, ContentAssistant, RewriteRequest, RewrittenSection};
use crate::layout::engine::PLACEHOLDER_TITLE;
use crate::layout::model::{ProjectType, Section, SectionType};

pub const ENHANCED_PREFIX: &str = "[AI Enhanced] ";

#[derive(Debug, Default, Clone, Copy)]
pub struct MockAssistant;

#[async_trait]
impl ContentAssistant for MockAssistant {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_raw_layout(
        &self,
        _prompt: &str,
        _current_layout: &[Section],
        project_type: ProjectType,
    ) -> Result<Vec<Value>, AssistError> {
        Ok(match project_type {
            ProjectType::Resume => sample_resume(),
            ProjectType::CoverLetter => sample_cover_letter(),
        })
    }

    async fn rewrite_section(
        &self,
        request: &RewriteRequest,
    ) -> Result<RewrittenSection, AssistError> {
        let title = match request.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() && t != PLACEHOLDER_TITLE => Some(t.to_string()),
            _ => Some(suggested_title(request.section_type).to_string()),
        };

        let content = if request.content.trim().is_empty() {
            sample_content(request.section_type).to_string()
        } else if request.content.starts_with(ENHANCED_PREFIX) {
            request.content.clone()
        } else {
            format!("{ENHANCED_PREFIX}{}", request.content)
        };

        Ok(RewrittenSection { title, content })
    }
}

fn suggested_title(section_type: SectionType) -> &'static str {
    match section_type {
        SectionType::Header => "Your Name",
        SectionType::Contact => "Contact Information",
        SectionType::Photo => "Photo",
        SectionType::Section => "Professional Summary",
        SectionType::Text => "Introduction",
        SectionType::Skills => "Core Competencies",
        SectionType::Experience => "Professional Experience",
        SectionType::Education => "Education",
    }
}

fn sample_content(section_type: SectionType) -> &'static str {
    match section_type {
        SectionType::Skills => "Communication, Problem Solving, Project Management",
        SectionType::Experience => {
            "Comprehensive experience overview with quantifiable results and impact metrics"
        }
        SectionType::Education => "Degree, Institution (Year)",
        SectionType::Contact => "your.email@example.com\n(555) 123-4567",
        _ => "Professional summary highlighting key achievements and expertise in the field",
    }
}

fn sample_resume() -> Vec<Value> {
    vec![
        json!({"id": "header-1", "type": "header", "title": "John Doe", "content": "Software Developer"}),
        json!({"id": "contact-1", "type": "contact", "title": "Contact",
               "content": "john.doe@email.com | (555) 123-4567 | linkedin.com/in/johndoe"}),
        json!({"id": "summary-1", "type": "section", "title": "Professional Summary",
               "content": "Results-driven software developer with 3+ years of experience building scalable web applications."}),
        json!({"id": "experience-1", "type": "experience", "title": "Professional Experience",
               "content": "Software Developer | Tech Company (2020-Present)\n• Developed web applications using React and Node.js\n• Improved application performance by 40% through code optimization"}),
        json!({"id": "skills-1", "type": "skills", "title": "Technical Skills",
               "content": ["JavaScript", "React", "Node.js", "TypeScript", "Python", "SQL", "Git", "AWS"]}),
        json!({"id": "education-1", "type": "education", "title": "Education",
               "content": "Bachelor of Computer Science\nUniversity Name (2016-2020)"}),
        json!({"id": "projects-1", "type": "section", "title": "Projects",
               "content": "E-commerce Platform | Personal Project\n• Built full-stack application with React and Express"}),
        json!({"id": "certifications-1", "type": "section", "title": "Certifications",
               "content": "AWS Certified Developer Associate (2023)"}),
    ]
}

fn sample_cover_letter() -> Vec<Value> {
    vec![
        json!({"id": "header-1", "type": "header", "title": "John Doe", "content": "Software Developer"}),
        json!({"id": "contact-1", "type": "contact", "title": "Contact Information",
               "content": "john.doe@email.com | (555) 123-4567\n[Date]\n\n[Hiring Manager Name]\n[Company Name]"}),
        json!({"id": "intro-1", "type": "text", "title": "Introduction",
               "content": "Dear Hiring Manager,\n\nI am writing to express my strong interest in the Software Developer position at your company."}),
        json!({"id": "body-1", "type": "text", "title": "Experience & Qualifications",
               "content": "In my current role I have delivered multiple web applications using React and Node.js."}),
        json!({"id": "body-2", "type": "text", "title": "Value Proposition",
               "content": "My skills in TypeScript and cloud technologies make me well-suited for this role."}),
        json!({"id": "closing-1", "type": "text", "title": "Closing",
               "content": "Thank you for considering my application.\n\nSincerely,\nJohn Doe"}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::{generate_layout, Tone};
    use crate::layout::model::SectionContent;

    fn request(title: Option<&str>, content: &str, section_type: SectionType) -> RewriteRequest {
        RewriteRequest {
            title: title.map(str::to_string),
            content: content.to_string(),
            section_type,
            project_type: ProjectType::Resume,
            tone: Tone::Professional,
        }
    }

    #[tokio::test]
    async fn test_mock_layouts_fill_exactly_the_cap() {
        for project_type in [ProjectType::Resume, ProjectType::CoverLetter] {
            let sections = generate_layout(&MockAssistant, "anything", &[], project_type)
                .await
                .unwrap();
            assert_eq!(sections.len(), project_type.max_sections());
        }
    }

    #[tokio::test]
    async fn test_mock_resume_skills_are_a_list() {
        let sections = generate_layout(&MockAssistant, "dev", &[], ProjectType::Resume)
            .await
            .unwrap();
        let skills = sections.iter().find(|s| s.id == "skills-1").unwrap();
        assert!(matches!(skills.content, SectionContent::List(ref items) if items.len() == 8));
    }

    #[tokio::test]
    async fn test_mock_rewrite_prefixes_once() {
        let first = MockAssistant
            .rewrite_section(&request(Some("Work"), "Built APIs", SectionType::Experience))
            .await
            .unwrap();
        assert_eq!(first.content, "[AI Enhanced] Built APIs");
        assert_eq!(first.title.as_deref(), Some("Work"));

        let again = MockAssistant
            .rewrite_section(&request(Some("Work"), &first.content, SectionType::Experience))
            .await
            .unwrap();
        assert_eq!(again.content, first.content);
    }

    #[tokio::test]
    async fn test_mock_rewrite_fills_empty_placeholder_section() {
        let rewritten = MockAssistant
            .rewrite_section(&request(Some(PLACEHOLDER_TITLE), " ", SectionType::Skills))
            .await
            .unwrap();
        assert_eq!(rewritten.title.as_deref(), Some("Core Competencies"));
        assert!(rewritten.content.contains("Problem Solving"));
    }
}
