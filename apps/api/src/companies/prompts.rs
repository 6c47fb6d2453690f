/// System prompt for the company summary fallback.
pub const COMPANY_SUMMARY_ROLE: &str = "You are a helpful assistant that provides accurate \
    company information. Focus on Australian operations when providing company details.";

/// Company summary prompt template. Replace `{subject}` before sending.
pub const COMPANY_SUMMARY_PROMPT_TEMPLATE: &str = r#"I need information about {subject}.

Please focus on the Australian operations of this company if it's multinational.

Return a JSON object with these fields:
{
  "name": "Company Name",
  "industry": "Industry",
  "size": "Size range (e.g., 1-50, 51-200, 201-1000, 1000+)",
  "location": "Australian headquarters location",
  "description": "Brief description (2-3 sentences) focusing on Australian operations",
  "products_services": "Main products or services in Australia",
  "year_founded": "Year established in Australia or 'Unknown'"
}"#;
