// Company profile scraping via an external task runner (Apify).
// Storage-agnostic: callers persist the returned profile themselves.

pub mod client;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod types;

pub use client::ScrapeConfig;
pub use error::ScrapeError;
pub use orchestrator::ScrapeOrchestrator;

/// Formats a user-supplied company reference as a LinkedIn company profile URL.
///
/// Anything already starting with `http` is passed through untouched.
pub fn company_profile_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http") {
        return input.to_string();
    }
    let slug = input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("https://www.linkedin.com/company/{slug}")
}
