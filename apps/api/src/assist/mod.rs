//! AI Content Service: pluggable, trait-based layout generation and section rewrites.
//!
//! Default: `LlmAssistant` (Claude via `llm_client`).
//! Without an API key: `MockAssistant` (fixed sample layouts, deterministic rewrites).
//!
//! Carried in `AppState` as `Arc<dyn ContentAssistant>`. Generated layouts
//! always pass through `sanitize::accept_generated_layout` before they reach
//! a project.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::layout::model::{ProjectType, Section, SectionType};
use crate::llm_client::LlmError;

pub mod handlers;
pub mod llm;
pub mod mock;
pub mod prompts;
pub mod sanitize;

pub use llm::LlmAssistant;
pub use mock::MockAssistant;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("AI returned a malformed layout: {0}")]
    MalformedLayout(String),

    #[error("Prompt cannot be empty")]
    EmptyPrompt,
}

/// Writing register requested for a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Creative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Creative => "creative",
        }
    }
}

/// Input for a single-section rewrite. `content` is the flat editor text.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub title: Option<String>,
    pub content: String,
    pub section_type: SectionType,
    pub project_type: ProjectType,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewrittenSection {
    pub title: Option<String>,
    pub content: String,
}

#[async_trait]
pub trait ContentAssistant: Send + Sync {
    /// Short backend name for logs and the status endpoint.
    fn name(&self) -> &'static str;

    /// True when replies come from a model rather than canned samples.
    fn is_live(&self) -> bool {
        false
    }

    /// Confirms the backend answers. Offline backends always do.
    async fn check_connection(&self) -> Result<(), AssistError> {
        Ok(())
    }

    /// Raw generated sections, before boundary validation.
    async fn generate_raw_layout(
        &self,
        prompt: &str,
        current_layout: &[Section],
        project_type: ProjectType,
    ) -> Result<Vec<Value>, AssistError>;

    async fn rewrite_section(
        &self,
        request: &RewriteRequest,
    ) -> Result<RewrittenSection, AssistError>;
}

/// Generates a replacement layout and validates it at the boundary.
///
/// The result is either a complete, capped, invariant-clean layout or an error;
/// a malformed reply is never partially applied.
pub async fn generate_layout(
    assistant: &dyn ContentAssistant,
    prompt: &str,
    current_layout: &[Section],
    project_type: ProjectType,
) -> Result<Vec<Section>, AssistError> {
    if prompt.trim().is_empty() {
        return Err(AssistError::EmptyPrompt);
    }

    let raw = assistant
        .generate_raw_layout(prompt.trim(), current_layout, project_type)
        .await?;
    let sections = sanitize::accept_generated_layout(raw, project_type)?;

    info!(
        "{} generated {} sections for a {project_type}",
        assistant.name(),
        sections.len()
    );
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::validate::is_valid;
    use serde_json::json;

    struct Oversupply;

    #[async_trait]
    impl ContentAssistant for Oversupply {
        fn name(&self) -> &'static str {
            "oversupply"
        }

        async fn generate_raw_layout(
            &self,
            _prompt: &str,
            _current_layout: &[Section],
            _project_type: ProjectType,
        ) -> Result<Vec<Value>, AssistError> {
            Ok((0..10)
                .map(|i| json!({"id": format!("p{i}"), "type": "text", "content": "x"}))
                .collect())
        }

        async fn rewrite_section(
            &self,
            request: &RewriteRequest,
        ) -> Result<RewrittenSection, AssistError> {
            Ok(RewrittenSection {
                title: request.title.clone(),
                content: request.content.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_generate_layout_truncates_to_cap() {
        let sections = generate_layout(&Oversupply, "a letter", &[], ProjectType::CoverLetter)
            .await
            .unwrap();
        assert_eq!(sections.len(), 6);
        assert_eq!(sections[5].id, "p5");
        assert!(is_valid(&sections));
    }

    #[tokio::test]
    async fn test_generate_layout_rejects_blank_prompt() {
        let result = generate_layout(&Oversupply, "   ", &[], ProjectType::Resume).await;
        assert!(matches!(result, Err(AssistError::EmptyPrompt)));
    }

    #[test]
    fn test_tone_defaults_to_professional() {
        assert_eq!(Tone::default(), Tone::Professional);
        let tone: Tone = serde_json::from_str("\"creative\"").unwrap();
        assert_eq!(tone.as_str(), "creative");
    }
}
