// Job descriptions: storage, LLM drafting, and community posting.

pub mod community;
pub mod generate;
pub mod handlers;
pub mod prompts;
