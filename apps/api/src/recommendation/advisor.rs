//! Career Advisor: asks the generative model for career suggestions and turns
//! its free-text reply into validated `CareerRecord`s.
//!
//! Flow per attempt: prompt → model → extract JSON array → structural check →
//! force path type / coerce fields → drop incomplete → rank → cap at 6.
//! Attempts are wrapped in the shared `RetryPolicy`; every failure ends in `None`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::llm_client::prompts::{COUNSELLOR_PERSONA, JSON_ONLY_INSTRUCTION, SALARY_INSTRUCTION};
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{extract_json_array, preview, AiError, TextModel};
use crate::models::career::{CareerRecord, PathType};
use crate::models::profile::{Qualification, UserProfile};
use crate::recommendation::default_engine::MAX_RECOMMENDATIONS;
use crate::recommendation::prompts::{RECOMMENDATION_OUTPUT_FORMAT, RECOMMENDATION_RULES};

/// Fields every career object in the model's reply must carry.
const REQUIRED_FIELDS: [&str; 8] = [
    "title",
    "description",
    "requirements",
    "skills",
    "salary_range",
    "salary_min",
    "salary_max",
    "path_type",
];

const RAW_PREVIEW_CHARS: usize = 200;

#[derive(Clone)]
pub struct CareerAdvisor {
    model: Arc<dyn TextModel>,
    retry: RetryPolicy,
}

impl CareerAdvisor {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::default(),
        }
    }

    /// Up to 6 AI-suggested careers, or `None` once every attempt has failed.
    /// Never returns an error: failures are logged against `request_id`.
    pub async fn get_recommendations(
        &self,
        profile: &UserProfile,
        request_id: &str,
    ) -> Option<Vec<CareerRecord>> {
        info!(request_id, "Processing career recommendation request");
        let prompt = build_recommendation_prompt(profile);
        let prompt = prompt.as_str();

        let result = self
            .retry
            .run(
                "career recommendations",
                request_id,
                |attempt| async move {
                    info!(request_id, attempt, "Requesting AI career recommendations");
                    let text = self.model.generate(prompt).await?;
                    debug!(request_id, raw = %preview(&text, RAW_PREVIEW_CHARS), "Raw AI response");
                    interpret_recommendations(&text, profile, request_id)
                },
                AiError::is_retryable,
            )
            .await;

        match result {
            Ok(careers) => {
                info!(
                    request_id,
                    count = careers.len(),
                    "Generated AI career recommendations"
                );
                Some(careers)
            }
            Err(err) => {
                error!(request_id, error = %err, "AI career recommendations unavailable");
                None
            }
        }
    }
}

/// Builds the counselling prompt from the profile. Lines for fields that do
/// not apply (stream before Class 12, plan after Class 12, empty values) are left out.
pub fn build_recommendation_prompt(profile: &UserProfile) -> String {
    let mut lines = vec![
        format!("{COUNSELLOR_PERSONA} Provide 6 suitable career paths for this student."),
        "Student Profile:".to_string(),
        format!("- Qualification: {}", profile.qualification.label()),
    ];

    if profile.qualification == Qualification::Class12 {
        if let Some(stream) = &profile.stream {
            lines.push(format!("- Stream: {}", stream.as_str()));
        }
    }
    if !profile.subjects.is_empty() {
        lines.push(format!("- Subjects: {}", profile.subjects));
    }
    if profile.qualification == Qualification::Class10 {
        if let Some(plan) = &profile.after_10th {
            lines.push(format!("- After 10th Plan: {}", plan.describe()));
        }
    }
    lines.push(format!(
        "- Higher Studies: {}",
        profile.higher_studies.map_or("No", |h| h.label())
    ));
    if let Some(age) = profile.age {
        lines.push(format!("- Age: {age}"));
    }
    lines.push(format!("- Location: {}", profile.location));
    if !profile.interests.is_empty() {
        lines.push(format!("- Interests: {}", profile.interests.join(", ")));
    }
    if let Some(income) = profile.income_level {
        lines.push(format!("- Family Income Level: {}", income.band()));
    }

    lines.push(String::new());
    lines.push(RECOMMENDATION_OUTPUT_FORMAT.to_string());
    lines.push(String::new());
    lines.push(RECOMMENDATION_RULES.to_string());
    lines.push(SALARY_INSTRUCTION.to_string());
    lines.push(JSON_ONLY_INSTRUCTION.to_string());
    lines.join("\n")
}

/// Turns one raw model reply into ranked careers, or the reason it can't.
pub fn interpret_recommendations(
    text: &str,
    profile: &UserProfile,
    request_id: &str,
) -> Result<Vec<CareerRecord>, AiError> {
    let parsed: Value = serde_json::from_str(extract_json_array(text))?;
    let items = validate_structure(&parsed)?;

    if items.is_empty() {
        return Err(AiError::EmptyResult);
    }

    let careers = normalize_careers(items, profile, request_id);
    if careers.is_empty() {
        warn!(request_id, "No valid career paths after validation");
        return Err(AiError::NoUsableItems);
    }

    Ok(rank_careers(careers))
}

/// The reply must be an array whose elements all carry the eight required
/// fields, with list skills, numeric salaries and a known path type.
/// An empty array is structurally fine.
pub fn validate_structure(parsed: &Value) -> Result<&[Value], AiError> {
    let items = parsed
        .as_array()
        .ok_or_else(|| AiError::InvalidFormat("expected a JSON array".to_string()))?;

    for (index, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| AiError::InvalidFormat(format!("item {index} is not an object")))?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(AiError::InvalidFormat(format!(
                "item {index} is missing '{missing}'"
            )));
        }
        if !object["skills"].is_array() {
            return Err(AiError::InvalidFormat(format!(
                "item {index}: skills must be an array"
            )));
        }
        if !object["salary_min"].is_number() || !object["salary_max"].is_number() {
            return Err(AiError::InvalidFormat(format!(
                "item {index}: salary_min and salary_max must be numbers"
            )));
        }
        if object["path_type"].as_str().and_then(PathType::parse).is_none() {
            return Err(AiError::InvalidFormat(format!(
                "item {index}: path_type must be higher_education or immediate"
            )));
        }
    }

    Ok(items)
}

/// Forces every career's path type to follow the student's higher-studies
/// choice, coerces salaries and skills, and drops careers without a title or
/// description.
pub fn normalize_careers(
    items: &[Value],
    profile: &UserProfile,
    request_id: &str,
) -> Vec<CareerRecord> {
    let path_type = PathType::for_higher_studies(profile.higher_studies);

    items
        .iter()
        .filter_map(|item| {
            let career = CareerRecord::from_loose(item, Some(path_type));
            if career.is_none() {
                warn!(request_id, career = %item, "Filtering out invalid career data");
            }
            career
        })
        .collect()
}

/// Sorts by `salary_max` (falling back to `salary_min`) descending, drops
/// repeated titles and caps the list.
fn rank_careers(mut careers: Vec<CareerRecord>) -> Vec<CareerRecord> {
    careers.sort_by_key(|c| std::cmp::Reverse(sort_salary(c)));

    let mut seen = HashSet::new();
    careers.retain(|c| seen.insert(c.title.clone()));
    careers.truncate(MAX_RECOMMENDATIONS);
    careers
}

fn sort_salary(career: &CareerRecord) -> i64 {
    if career.salary_max != 0 {
        career.salary_max
    } else {
        career.salary_min
    }
}
