// Cross-cutting prompt fragments.
// Each feature module that calls the LLM keeps its own prompts.rs alongside it.

/// Appended to system prompts whose callers parse the reply as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Builds a JSON-only system prompt from a role description.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_INSTRUCTION}")
}
