// Prompt text for career recommendations.
// Cross-cutting fragments come from llm_client::prompts.

/// Output contract for the recommendation prompt.
pub const RECOMMENDATION_OUTPUT_FORMAT: &str = r#"Output a JSON array with EXACTLY 6 objects, each with these EXACT fields:
- title: job/career title
- description: 2-3 sentences about the career
- requirements: education/qualification needed
- skills: array of 3-5 skills needed
- salary_range: text description (e.g. "₹15,000 - ₹35,000")
- salary_min: number (e.g. 15000)
- salary_max: number (e.g. 35000)
- path_type: MUST BE EXACTLY "higher_education" or "immediate""#;

/// Path-type and personalisation rules for the recommendation prompt.
pub const RECOMMENDATION_RULES: &str = r#"If Higher Studies is "Yes", ALL careers must have path_type "higher_education".
If Higher Studies is "No", ALL careers must have path_type "immediate".
Prioritise careers available locally or remotely from the student's location.
Consider the student's interests and family income level in your recommendations."#;
