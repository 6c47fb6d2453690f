/// System prompt for job description drafting.
pub const JD_GENERATION_SYSTEM: &str = "You are an expert AI recruiter who creates compelling \
    job descriptions for AI and technology roles.";

/// Job description prompt template.
/// Replace: {title}, {company_name}, {company_block}, {job_type}, {experience_level},
///          {location}, {salary_range}, {ai_tools}
pub const JD_GENERATION_PROMPT_TEMPLATE: &str = r#"Generate a professional job description for a {title} position at {company_name}.

Company Information:
{company_block}

Job Details:
- Title: {title}
- Type: {job_type}
- Experience Level: {experience_level}
- Location: {location}
- Salary Range: {salary_range}

Required AI Technologies:
{ai_tools}

Format the response as a JSON object with the following fields:
1. "description": A compelling overview of the role (200-300 words)
2. "responsibilities": A list of 5-7 key responsibilities, each on a new line starting with "- "
3. "requirements": A list of 5-7 key requirements/qualifications, each on a new line starting with "- "

Make the job description specific to the AI industry, emphasizing modern AI practices and technologies."#;
