// CV optimization against a job description, plus training recommendations for skill gaps.

pub mod extract;
pub mod handlers;
pub mod prompts;
