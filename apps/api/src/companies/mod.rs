// Company profiles: LinkedIn scrape + persist, and the completion-service fallback.

pub mod handlers;
pub mod prompts;
