// Prompt text for career roadmaps.

/// Output contract for the roadmap prompt.
pub const ROADMAP_OUTPUT_FORMAT: &str = r#"Output ONE JSON object with these EXACT fields:
- title: the career title
- summary: 2-3 sentences describing the career path
- timeline: array of 4-6 stages, from first step to senior level, each with:
    stage, duration, description, key_skills (array), education,
    typical_roles (array), salary_range, growth_tips (array)
- learning_resources: array of objects with name, type, link (free or low-cost first)
- industry_outlook: object with growth, demand, future_trends
- local_relevance: how the student can pursue this career from a small town or village"#;

/// Keeps the roadmap practical for the audience.
pub const ROADMAP_RULES: &str = "\
    Prefer affordable, government and online routes over expensive private coaching. \
    Mention relevant government schemes and scholarships where they apply.";
