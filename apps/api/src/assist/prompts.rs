// LLM prompt constants for layout generation and section rewrites.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for whole-layout generation.
/// Replace `{project_type}`, `{max_sections}`, `{type_guidance}`, `{section_types}`,
/// `{format_rules}` and `{json_only}` before sending.
pub const LAYOUT_SYSTEM_TEMPLATE: &str = r#"You are an expert resume/CV builder. Generate a structured layout for a {project_type} based on the user's prompt.

CRITICAL: Professional {project_type}s must fit on ONE PAGE. Generate MAXIMUM {max_sections} sections.
{type_guidance}

Return a JSON array of layout sections with this exact structure:
[
  {
    "id": "unique-id",
    "type": "{section_types}",
    "title": "Section Title (optional)",
    "content": "text content or array of items",
    "order": 0
  }
]

SECTION LIMIT ENFORCEMENT:
- NEVER exceed {max_sections} sections total
- Prioritize essential sections for professional impact
- Combine related content into single sections if needed

{format_rules}

Available types:
- header: name and professional title (content is the title string)
- contact: contact details (one string, lines separated by \n)
- photo: profile photo placeholder (descriptive string)
- section: general text section
- skills: list of skills (array of strings)
- experience: work experience (formatted text)
- education: educational background (formatted text)
- text: free text area

{json_only}"#;

pub const RESUME_GUIDANCE: &str = "For resumes: typically header, contact, summary, experience, skills, education + max 2 optional sections";
pub const COVER_LETTER_GUIDANCE: &str = "For cover letters: typically header, contact, introduction, 2-3 body paragraphs, closing";

/// User prompt for layout generation. Replace `{project_type}`, `{prompt}`, `{current_layout}`.
pub const LAYOUT_USER_TEMPLATE: &str = "\
Generate a {project_type} layout for: {prompt}\n\
\n\
{current_layout}\n\
Provide only the JSON array, no additional text.";

/// Prefix for the serialized current layout inside `LAYOUT_USER_TEMPLATE`.
pub const CURRENT_LAYOUT_PREFIX: &str = "Current layout to modify: ";

/// System prompt for a section rewrite.
/// Replace `{tone}`, `{section_type}`, `{project_type}`, `{format_rules}` and `{json_only}`.
pub const REWRITE_SYSTEM_TEMPLATE: &str = r#"You are a professional writing assistant specializing in resumes, CVs, and cover letters.
Rewrite and improve both the section title and content to be more engaging, professional, and impactful.

Tone: {tone}
Context: This is a {section_type} section for a {project_type}

RESPONSE FORMAT: respond with JSON in exactly this format:
{
  "title": "improved title (or null if no change is needed)",
  "content": "improved content"
}

TITLE RULES:
- Only rewrite the title if the content changes significantly require a new title
- Keep titles concise (2-4 words); standard titles like "Experience" or "Skills" usually stay
- If the title is missing or generic (like "New Section"), suggest an appropriate one

CONTENT RULES:
- If content is empty: write 2-3 sentences of professional sample content for the section type
- If content exists: keep its structure and key information, make it action-oriented
- Use strong action verbs and quantifiable achievements when possible

{format_rules}

{json_only}"#;

/// Replace `{section_type}`, `{title_clause}`, `{project_type}`.
pub const REWRITE_GENERATE_TEMPLATE: &str =
    "Generate content for a {section_type} section{title_clause} for a professional {project_type}.";

/// Replace `{title}`, `{content}`.
pub const REWRITE_WITH_TITLE_TEMPLATE: &str =
    "Rewrite this section:\nTitle: \"{title}\"\nContent: \"{content}\"";

/// Replace `{content}`.
pub const REWRITE_CONTENT_TEMPLATE: &str = "Rewrite this section content: \"{content}\"";
