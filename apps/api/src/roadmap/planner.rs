//! Roadmap Planner: asks the generative model for a staged roadmap for one
//! career and validates the reply into a `RoadmapRecord`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::llm_client::prompts::{COUNSELLOR_PERSONA, JSON_ONLY_INSTRUCTION, SALARY_INSTRUCTION};
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{extract_json_object, preview, AiError, TextModel};
use crate::models::career::{CareerDetails, RoadmapRecord};
use crate::roadmap::prompts::{ROADMAP_OUTPUT_FORMAT, ROADMAP_RULES};

/// Top-level fields a roadmap reply must carry. `title` is optional and
/// filled from the request when missing.
const REQUIRED_FIELDS: [&str; 5] = [
    "summary",
    "timeline",
    "learning_resources",
    "industry_outlook",
    "local_relevance",
];

const RAW_PREVIEW_CHARS: usize = 200;

#[derive(Clone)]
pub struct RoadmapPlanner {
    model: Arc<dyn TextModel>,
    retry: RetryPolicy,
}

impl RoadmapPlanner {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::default(),
        }
    }

    /// A roadmap for `title`, or `None` once every attempt has failed.
    pub async fn get_roadmap(
        &self,
        title: &str,
        details: Option<&CareerDetails>,
        request_id: &str,
    ) -> Option<RoadmapRecord> {
        info!(request_id, career = title, "Processing career roadmap request");
        let prompt = build_roadmap_prompt(title, details);
        let prompt = prompt.as_str();

        let result = self
            .retry
            .run(
                "career roadmap",
                request_id,
                |attempt| async move {
                    info!(request_id, attempt, "Requesting AI career roadmap");
                    let text = self.model.generate(prompt).await?;
                    debug!(request_id, raw = %preview(&text, RAW_PREVIEW_CHARS), "Raw AI response");
                    interpret_roadmap(&text, title)
                },
                AiError::is_retryable,
            )
            .await;

        match result {
            Ok(roadmap) => {
                info!(
                    request_id,
                    stages = roadmap.timeline.len(),
                    "Generated AI career roadmap"
                );
                Some(roadmap)
            }
            Err(err) => {
                error!(request_id, error = %err, "AI career roadmap unavailable");
                None
            }
        }
    }
}

pub fn build_roadmap_prompt(title: &str, details: Option<&CareerDetails>) -> String {
    let mut lines = vec![
        format!("{COUNSELLOR_PERSONA} Create a detailed career roadmap for: {title}."),
    ];

    if let Some(details) = details {
        let mut known = Vec::new();
        if let Some(description) = details.description.as_deref().filter(|d| !d.is_empty()) {
            known.push(format!("- Description: {description}"));
        }
        if let Some(requirements) = &details.requirements {
            let requirements = requirements.joined();
            if !requirements.is_empty() {
                known.push(format!("- Requirements: {requirements}"));
            }
        }
        if !details.skills.is_empty() {
            known.push(format!("- Skills: {}", details.skills.join(", ")));
        }
        if let Some(salary) = details.salary_range.as_deref().filter(|s| !s.is_empty()) {
            known.push(format!("- Salary Range: {salary}"));
        }
        if !known.is_empty() {
            lines.push("Known career details:".to_string());
            lines.extend(known);
        }
    }

    lines.push(String::new());
    lines.push(ROADMAP_OUTPUT_FORMAT.to_string());
    lines.push(String::new());
    lines.push(ROADMAP_RULES.to_string());
    lines.push(SALARY_INSTRUCTION.to_string());
    lines.push(JSON_ONLY_INSTRUCTION.to_string());
    lines.join("\n")
}

/// Turns one raw model reply into a roadmap, or the reason it can't.
pub fn interpret_roadmap(text: &str, title: &str) -> Result<RoadmapRecord, AiError> {
    let parsed: Value = serde_json::from_str(extract_json_object(text))?;
    let object = parsed
        .as_object()
        .ok_or_else(|| AiError::InvalidFormat("expected a JSON object".to_string()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(AiError::InvalidFormat(format!("missing '{missing}'")));
    }
    for field in ["timeline", "learning_resources"] {
        if !object[field].as_array().is_some_and(|items| !items.is_empty()) {
            return Err(AiError::InvalidFormat(format!(
                "'{field}' must be a non-empty array"
            )));
        }
    }

    let mut roadmap: RoadmapRecord = serde_json::from_value(parsed)?;
    if roadmap.title.trim().is_empty() {
        roadmap.title = title.to_string();
    }
    Ok(roadmap)
}
