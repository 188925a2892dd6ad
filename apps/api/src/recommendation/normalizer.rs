//! Profile Normalizer: maps loosely shaped form / API input to a `UserProfile`.
//!
//! Never fails: anything unmapped falls back to a neutral default.

use serde::Deserialize;

use crate::models::profile::{
    After10th, HigherStudies, IncomeLevel, Qualification, Stream, UserProfile,
};

/// A scalar that may arrive as a JSON number, boolean or string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Number(serde_json::Number),
    Bool(bool),
    Text(String),
}

impl RawScalar {
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Integer value, if the scalar is an integral number or numeric text.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

/// Interests arrive either as a list or as one value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawInterests {
    Many(Vec<String>),
    One(String),
}

/// Raw assessment input exactly as the client sent it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfileInput {
    pub qualification: Option<String>,
    pub stream: Option<String>,
    pub subjects: Option<String>,
    pub age: Option<RawScalar>,
    pub location: Option<String>,
    pub higher_studies: Option<RawScalar>,
    pub income_level: Option<String>,
    pub interests: Option<RawInterests>,
    #[serde(rename = "after10th")]
    pub after_10th: Option<String>,
}

impl RawProfileInput {
    /// Builds the input from url-encoded form pairs. Repeated `interests`
    /// (or `interests[]`) keys become a list; a single one stays a single value.
    pub fn from_form_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut input = Self::default();
        let mut interests = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "qualification" => input.qualification = Some(value),
                "stream" => input.stream = Some(value),
                "subjects" => input.subjects = Some(value),
                "age" => input.age = Some(RawScalar::Text(value)),
                "location" => input.location = Some(value),
                "higherStudies" => input.higher_studies = Some(RawScalar::Text(value)),
                "incomeLevel" => input.income_level = Some(value),
                "interests" | "interests[]" => interests.push(value),
                "after10th" => input.after_10th = Some(value),
                _ => {}
            }
        }

        input.interests = match interests.len() {
            0 => None,
            1 => interests.pop().map(RawInterests::One),
            _ => Some(RawInterests::Many(interests)),
        };
        input
    }
}

/// Maps raw input to a canonical profile.
///
/// - `after10th` / `after12th` become Class 10 / Class 12, anything else `Unknown`
/// - `pcm` / `pcb` become Science, with `PCM` / `PCB` prefixed onto the subjects
/// - `commerce` / `arts` become Commerce / Arts
/// - interests: a list is kept, a single non-empty value is wrapped, otherwise empty
///
/// Canonical values (`Class 12`, `Science`, ...) map to themselves, so
/// normalizing an already normalized profile changes nothing.
pub fn normalize(raw: &RawProfileInput) -> UserProfile {
    let qualification = raw
        .qualification
        .as_deref()
        .map(Qualification::from_raw)
        .unwrap_or_default();

    let mut subjects = raw.subjects.clone().unwrap_or_default();
    let stream = match raw.stream.as_deref() {
        None | Some("") => None,
        Some(code @ ("pcm" | "pcb")) => {
            let prefix = code.to_uppercase();
            subjects = if subjects.is_empty() {
                prefix
            } else {
                format!("{prefix}, {subjects}")
            };
            Some(Stream::Science)
        }
        Some("commerce") => Some(Stream::Commerce),
        Some("arts") => Some(Stream::Arts),
        Some(label) => Some(Stream::from_label(label)),
    };

    let interests = match &raw.interests {
        Some(RawInterests::Many(list)) => list.clone(),
        Some(RawInterests::One(single)) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };

    UserProfile {
        qualification,
        stream,
        subjects,
        age: raw
            .age
            .as_ref()
            .and_then(RawScalar::as_integer)
            .and_then(|age| u32::try_from(age).ok()),
        location: raw.location.clone().unwrap_or_default(),
        higher_studies: raw
            .higher_studies
            .as_ref()
            .and_then(|h| HigherStudies::from_raw(&h.to_text())),
        income_level: raw.income_level.as_deref().and_then(IncomeLevel::from_raw),
        interests,
        after_10th: raw.after_10th.as_deref().and_then(After10th::from_raw),
    }
}
