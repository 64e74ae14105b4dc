//! Claude-backed content assistant.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::assist::prompts::{
    COVER_LETTER_GUIDANCE, CURRENT_LAYOUT_PREFIX, LAYOUT_SYSTEM_TEMPLATE, LAYOUT_USER_TEMPLATE,
    RESUME_GUIDANCE, REWRITE_CONTENT_TEMPLATE, REWRITE_GENERATE_TEMPLATE,
    REWRITE_SYSTEM_TEMPLATE, REWRITE_WITH_TITLE_TEMPLATE,
};
use crate::assist::sanitize::sanitize_rewrite;
use crate::assist::{AssistError, ContentAssistant, RewriteRequest, RewrittenSection};
use crate::layout::model::{ProjectType, Section, SectionType};
use crate::llm_client::prompts::{CONTENT_FORMAT_RULES, JSON_ONLY_SYSTEM};
use crate::llm_client::{CallOptions, LlmClient};

pub struct LlmAssistant {
    llm: LlmClient,
}

impl LlmAssistant {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentAssistant for LlmAssistant {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn check_connection(&self) -> Result<(), AssistError> {
        Ok(self.llm.ping().await?)
    }

    async fn generate_raw_layout(
        &self,
        prompt: &str,
        current_layout: &[Section],
        project_type: ProjectType,
    ) -> Result<Vec<Value>, AssistError> {
        let system = build_layout_system(project_type);
        let user = build_layout_prompt(prompt, current_layout, project_type)?;
        debug!("Requesting {project_type} layout ({} chars of prompt)", user.len());

        Ok(self
            .llm
            .call_json::<Vec<Value>>(&user, &system, CallOptions::LAYOUT)
            .await?)
    }

    async fn rewrite_section(
        &self,
        request: &RewriteRequest,
    ) -> Result<RewrittenSection, AssistError> {
        let system = build_rewrite_system(request);
        let user = build_rewrite_prompt(request);

        let reply = self
            .llm
            .call_text(&user, &system, CallOptions::REWRITE)
            .await?;
        Ok(sanitize_rewrite(
            &reply,
            request.title.as_deref(),
            &request.content,
        ))
    }
}

pub(crate) fn build_layout_system(project_type: ProjectType) -> String {
    let guidance = match project_type {
        ProjectType::Resume => RESUME_GUIDANCE,
        ProjectType::CoverLetter => COVER_LETTER_GUIDANCE,
    };
    let section_types = SectionType::ALL
        .iter()
        .map(SectionType::as_str)
        .collect::<Vec<_>>()
        .join("|");
    LAYOUT_SYSTEM_TEMPLATE
        .replace("{project_type}", project_type.as_str())
        .replace("{max_sections}", &project_type.max_sections().to_string())
        .replace("{type_guidance}", guidance)
        .replace("{section_types}", &section_types)
        .replace("{format_rules}", CONTENT_FORMAT_RULES)
        .replace("{json_only}", JSON_ONLY_SYSTEM)
}

pub(crate) fn build_layout_prompt(
    prompt: &str,
    current_layout: &[Section],
    project_type: ProjectType,
) -> Result<String, AssistError> {
    let current = if current_layout.is_empty() {
        String::new()
    } else {
        let json = serde_json::to_string(current_layout)
            .map_err(|e| AssistError::Llm(e.into()))?;
        format!("{CURRENT_LAYOUT_PREFIX}{json}\n")
    };
    Ok(LAYOUT_USER_TEMPLATE
        .replace("{project_type}", project_type.as_str())
        .replace("{prompt}", prompt)
        .replace("{current_layout}", &current))
}

pub(crate) fn build_rewrite_system(request: &RewriteRequest) -> String {
    REWRITE_SYSTEM_TEMPLATE
        .replace("{tone}", request.tone.as_str())
        .replace("{section_type}", request.section_type.as_str())
        .replace("{project_type}", request.project_type.as_str())
        .replace("{format_rules}", CONTENT_FORMAT_RULES)
        .replace("{json_only}", JSON_ONLY_SYSTEM)
}

pub(crate) fn build_rewrite_prompt(request: &RewriteRequest) -> String {
    let title = request.title.as_deref().filter(|t| !t.trim().is_empty());
    if request.content.trim().is_empty() {
        let title_clause = title
            .map(|t| format!(" with title \"{t}\""))
            .unwrap_or_default();
        return REWRITE_GENERATE_TEMPLATE
            .replace("{section_type}", request.section_type.as_str())
            .replace("{title_clause}", &title_clause)
            .replace("{project_type}", request.project_type.as_str());
    }
    match title {
        Some(title) => REWRITE_WITH_TITLE_TEMPLATE
            .replace("{title}", title)
            .replace("{content}", &request.content),
        None => REWRITE_CONTENT_TEMPLATE.replace("{content}", &request.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::Tone;
    use crate::layout::model::{SectionContent, SectionType};

    fn request(title: Option<&str>, content: &str) -> RewriteRequest {
        RewriteRequest {
            title: title.map(str::to_string),
            content: content.to_string(),
            section_type: SectionType::Experience,
            project_type: ProjectType::Resume,
            tone: Tone::Casual,
        }
    }

    #[test]
    fn test_layout_system_carries_cap_and_guidance() {
        let system = build_layout_system(ProjectType::CoverLetter);
        assert!(system.contains("MAXIMUM 6 sections"));
        assert!(system.contains(COVER_LETTER_GUIDANCE));
        assert!(!system.contains("{json_only}"));
    }

    #[test]
    fn test_layout_prompt_embeds_current_layout() {
        let current = vec![Section::new(
            "h",
            SectionType::Header,
            Some("Jo"),
            SectionContent::from("Engineer"),
            0,
        )];
        let prompt = build_layout_prompt("data engineer", &current, ProjectType::Resume).unwrap();
        assert!(prompt.contains("data engineer"));
        assert!(prompt.contains(CURRENT_LAYOUT_PREFIX));
        assert!(prompt.contains("\"id\":\"h\""));

        let bare = build_layout_prompt("x", &[], ProjectType::Resume).unwrap();
        assert!(!bare.contains(CURRENT_LAYOUT_PREFIX));
    }

    #[test]
    fn test_rewrite_prompt_variants() {
        assert!(build_rewrite_prompt(&request(None, "")).starts_with("Generate content"));
        assert!(build_rewrite_prompt(&request(Some("Work"), "")).contains("with title \"Work\""));
        assert!(build_rewrite_prompt(&request(Some("Work"), "did x")).contains("Title: \"Work\""));
        assert!(build_rewrite_prompt(&request(None, "did x")).starts_with("Rewrite this section content"));
    }

    #[test]
    fn test_rewrite_system_uses_tone() {
        assert!(build_rewrite_system(&request(None, "x")).contains("Tone: casual"));
    }
}
