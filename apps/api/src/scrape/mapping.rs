//! Maps a raw LinkedIn company record from the scraper dataset into a `CompanyProfile`.

use chrono::Utc;
use serde_json::Value;

use crate::scrape::types::CompanyProfile;

/// Converts a raw scraped record. Absent input (or JSON `null`) stays absent.
pub fn map_raw_record(raw: Option<Value>) -> Option<CompanyProfile> {
    let raw = raw.filter(|v| !v.is_null())?;

    let employee_count = raw
        .get("company_size")
        .and_then(Value::as_str)
        .and_then(parse_employee_count);

    Some(CompanyProfile {
        name: string_field(&raw, "company_name"),
        website_url: string_field(&raw, "company_website"),
        industry: string_field(&raw, "company_industry"),
        employee_count,
        location: string_field(&raw, "company_headquarters"),
        retrieved_at: Utc::now(),
        raw_source_data: raw,
    })
}

/// Extracts the first number from a size descriptor such as "10,001+ employees".
///
/// The number is the first run that starts with a digit and continues with digits
/// or `,` separators. Separators are dropped before parsing.
pub fn parse_employee_count(size: &str) -> Option<u64> {
    let start = size.find(|c: char| c.is_ascii_digit())?;
    let digits: String = size[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn string_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
