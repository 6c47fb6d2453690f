//! Job description drafting: prompt assembly and parsing of the completion text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job_posts::prompts::JD_GENERATION_PROMPT_TEMPLATE;
use crate::llm_client::strip_json_fences;
use crate::scrape::mapping::parse_employee_count;

/// Headcount above which a company is described as an enterprise.
const ENTERPRISE_HEADCOUNT: u64 = 1000;

const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDetails {
    #[serde(default)]
    pub title: String,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    #[serde(default)]
    pub ai_tools: Vec<String>,
}

/// The three sections of a drafted job description. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedJd {
    pub description: String,
    pub responsibilities: String,
    pub requirements: String,
}

/// Builds the drafting prompt from the (optional) stored company row and the job details.
pub fn build_prompt(company: Option<&Value>, details: &JobDetails) -> String {
    let company_name = company_str(company, "name").unwrap_or("a company");

    let mut company_block = vec![
        format!(
            "- Name: {}",
            company_str(company, "name").unwrap_or(NOT_SPECIFIED)
        ),
        format!(
            "- Industry: {}",
            company_str(company, "industry").unwrap_or(NOT_SPECIFIED)
        ),
        format!("- Size: {}", size_band(company)),
        format!(
            "- Location: {}",
            company_str(company, "location").unwrap_or(NOT_SPECIFIED)
        ),
    ];
    if let Some(about) = company
        .and_then(|c| c.pointer("/apify_data/company_about_us"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    {
        company_block.push(format!("- About: {about}"));
    }

    let ai_tools = if details.ai_tools.is_empty() {
        format!("- {NOT_SPECIFIED}")
    } else {
        details
            .ai_tools
            .iter()
            .map(|tool| format!("- {tool}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    JD_GENERATION_PROMPT_TEMPLATE
        .replace("{title}", details.title.trim())
        .replace("{company_name}", company_name)
        .replace("{company_block}", &company_block.join("\n"))
        .replace("{job_type}", or_unspecified(&details.job_type))
        .replace("{experience_level}", or_unspecified(&details.experience_level))
        .replace("{location}", or_unspecified(&details.location))
        .replace("{salary_range}", or_unspecified(&details.salary_range))
        .replace("{ai_tools}", &ai_tools)
}

fn company_str<'a>(company: Option<&'a Value>, key: &str) -> Option<&'a str> {
    company
        .and_then(|c| c.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn or_unspecified(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NOT_SPECIFIED)
}

/// Headcount from `size`, which is numeric for scraped rows but free text when edited
/// by hand or summarised by the model ("51-200 employees").
fn headcount(company: Option<&Value>) -> Option<u64> {
    match company?.get("size")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_employee_count(s),
        _ => None,
    }
}

fn size_band(company: Option<&Value>) -> &'static str {
    match headcount(company) {
        Some(0) | None => NOT_SPECIFIED,
        Some(n) if n > ENTERPRISE_HEADCOUNT => "Enterprise",
        Some(_) => "Small to Medium Business",
    }
}

/// Parses the completion text. JSON is preferred; otherwise each section is cut out of
/// the text with a tolerant pattern so that almost-JSON replies still produce a draft.
pub fn parse_generated_jd(text: &str) -> GeneratedJd {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(value) if value.is_object() => GeneratedJd {
            description: section_text(value.get("description")),
            responsibilities: section_text(value.get("responsibilities")),
            requirements: section_text(value.get("requirements")),
        },
        _ => extract_sections(text),
    }
}

/// Strings pass through; arrays become "- item" lines.
fn section_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| {
                let item = item.trim();
                if item.starts_with("- ") {
                    item.to_string()
                } else {
                    format!("- {item}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn section_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"(?s)description"?:\s*"?(.*?)"?,\s*"?responsibilities"#,
            r#"(?s)responsibilities"?:\s*"?(.*?)"?,\s*"?requirements"#,
            r#"(?s)requirements"?:\s*"?(.*?)"?(?:\}|$)"#,
        ]
        .map(|p| Regex::new(p).expect("section pattern is valid"))
    })
}

fn extract_sections(text: &str) -> GeneratedJd {
    let [description, responsibilities, requirements] = section_patterns();
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().trim_matches('"').trim().to_string())
            .unwrap_or_default()
    };
    GeneratedJd {
        description: capture(description),
        responsibilities: capture(responsibilities),
        requirements: capture(requirements),
    }
}
