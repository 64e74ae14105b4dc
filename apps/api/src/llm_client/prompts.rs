// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every system prompt that expects a machine-readable reply.
pub const JSON_ONLY_SYSTEM: &str = "\
You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON value. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// Formatting rules for section content, shared by generation and rewrite.
pub const CONTENT_FORMAT_RULES: &str = "\
CRITICAL CONTENT FORMATTING RULES:\n\
- content MUST be either a STRING or an ARRAY OF STRINGS\n\
- NEVER use objects like {\"Name\": \"John\", \"Phone\": \"123\"}\n\
- For contact info, use a single string with line breaks: \"john@email.com\\n(555) 123-4567\"\n\
- For skills, use an array: [\"JavaScript\", \"React\", \"Node.js\"]\n\
- For other sections, use plain text strings with \\n for line breaks";
