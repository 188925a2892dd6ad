// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs beside it; only cross-cutting instructions live here.

/// Opening line for every counselling prompt.
pub const COUNSELLOR_PERSONA: &str = "You are a career counseling expert who advises students in rural India.";

/// Appended to every prompt that expects machine-readable output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT include explanations or apologies.";

/// Keeps salary figures grounded in the local job market.
pub const SALARY_INSTRUCTION: &str = "\
    Use realistic monthly salary figures for India in rupees (₹). \
    Entry-level figures must reflect what a fresher in a small town can actually earn.";
