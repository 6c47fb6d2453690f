pub const CV_OPTIMIZATION_ROLE: &str = "You are an expert CV writer who optimizes CVs to match \
    job descriptions. Analyze the CV and job description, then rewrite the CV to highlight \
    relevant skills and experience.";

/// CV optimization prompt template. Replace `{cv_text}` and `{job_description}`.
pub const CV_OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"Here is my current CV:
{cv_text}

And here is the job description I'm applying for:
{job_description}

Please rewrite my CV to better match this job description. Highlight relevant skills and experience, and format it professionally.
Return the result as a JSON object with these fields:
1. "optimized_cv": The rewritten CV text
2. "skill_gaps": Array of skills mentioned in the job description that are missing from my CV
3. "relevance_score": A score from 0-100 indicating how well my experience matches the job
4. "improvement_areas": Key suggestions for improving my CV further"#;

pub const TRAINING_ROLE: &str = "You are an expert career advisor who recommends training \
    courses to help people develop skills for their career.";

/// Training recommendation prompt template. Replace `{skills}`.
pub const TRAINING_PROMPT_TEMPLATE: &str = r#"I need to develop the following skills for a job:
{skills}

Please recommend specific training courses, certifications, or resources for each skill.
Return a JSON object {"recommendations": [...]} where each item has:
1. "skill": The skill name
2. "courses": Array of recommended courses (name, provider, URL if available)
3. "certifications": Array of relevant certifications
4. "estimated_time": Estimated time to achieve proficiency (e.g., "2-3 months")
5. "difficulty_level": Beginner, Intermediate, or Advanced"#;
