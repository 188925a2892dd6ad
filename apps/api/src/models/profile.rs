//! Canonical student profile produced by the normalizer and consumed by every
//! recommendation path.

use serde::{Serialize, Serializer};

/// Highest qualification the student holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Qualification {
    #[serde(rename = "Class 10")]
    Class10,
    #[serde(rename = "Class 12")]
    Class12,
    #[default]
    Unknown,
}

impl Qualification {
    /// Maps a form value (`after10th` / `after12th`) or an already canonical
    /// label (`Class 10` / `Class 12`). Anything else is `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "after10th" | "Class 10" => Self::Class10,
            "after12th" | "Class 12" => Self::Class12,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Class10 => "Class 10",
            Self::Class12 => "Class 12",
            Self::Unknown => "Unknown",
        }
    }
}

/// Academic stream. `Other` keeps unrecognised values verbatim so they can
/// still be looked up (and miss) in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    Science,
    Commerce,
    Arts,
    Other(String),
}

impl Stream {
    /// Parses a canonical stream label; unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Science" => Self::Science,
            "Commerce" => Self::Commerce,
            "Arts" => Self::Arts,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Science => "Science",
            Self::Commerce => "Commerce",
            Self::Arts => "Arts",
            Self::Other(label) => label,
        }
    }
}

impl Serialize for Stream {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What a Class 10 student plans to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum After10th {
    Continue,
    Diploma,
    Iti,
    Other(String),
}

impl After10th {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "continue" => Some(Self::Continue),
            "diploma" => Some(Self::Diploma),
            "iti" => Some(Self::Iti),
            other => Some(Self::Other(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Continue => "continue",
            Self::Diploma => "diploma",
            Self::Iti => "iti",
            Self::Other(plan) => plan,
        }
    }

    /// Human-readable plan used in prompts.
    pub fn describe(&self) -> &str {
        match self {
            Self::Continue => "Continue to 11th & 12th",
            Self::Diploma => "Pursue Diploma",
            Self::Iti => "Join ITI",
            Self::Other(plan) => plan,
        }
    }
}

impl Serialize for After10th {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Whether the student intends to keep studying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HigherStudies {
    Yes,
    No,
}

impl HigherStudies {
    /// Accepts `Yes`/`No` and the boolean spellings the JSON API allows,
    /// case-insensitively.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Some(Self::Yes),
            "no" | "false" => Some(Self::No),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

/// Monthly family income band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

impl IncomeLevel {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn band(&self) -> &'static str {
        match self {
            Self::Low => "Below ₹15,000",
            Self::Medium => "₹15,000 - ₹50,000",
            Self::High => "Above ₹50,000",
        }
    }
}

/// A student's profile, built once per request and never mutated afterwards.
///
/// `qualification`, `stream` and `subjects` together select the catalog bucket;
/// an unrecognised combination simply selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub qualification: Qualification,
    pub stream: Option<Stream>,
    pub subjects: String,
    pub age: Option<u32>,
    pub location: String,
    pub higher_studies: Option<HigherStudies>,
    pub income_level: Option<IncomeLevel>,
    pub interests: Vec<String>,
    #[serde(rename = "after10th")]
    pub after_10th: Option<After10th>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualification_accepts_form_and_canonical_values() {
        assert_eq!(Qualification::from_raw("after10th"), Qualification::Class10);
        assert_eq!(Qualification::from_raw("Class 12"), Qualification::Class12);
        assert_eq!(Qualification::from_raw("graduate"), Qualification::Unknown);
    }

    #[test]
    fn test_higher_studies_accepts_boolean_spellings() {
        assert_eq!(HigherStudies::from_raw("Yes"), Some(HigherStudies::Yes));
        assert_eq!(HigherStudies::from_raw("false"), Some(HigherStudies::No));
        assert_eq!(HigherStudies::from_raw("maybe"), None);
    }

    #[test]
    fn test_profile_serializes_with_canonical_labels() {
        let profile = UserProfile {
            qualification: Qualification::Class12,
            stream: Some(Stream::Science),
            subjects: "PCM".to_string(),
            age: Some(17),
            location: "Nashik".to_string(),
            higher_studies: Some(HigherStudies::Yes),
            income_level: Some(IncomeLevel::Low),
            interests: vec!["robotics".to_string()],
            after_10th: None,
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["qualification"], "Class 12");
        assert_eq!(json["stream"], "Science");
        assert_eq!(json["higherStudies"], "Yes");
        assert_eq!(json["incomeLevel"], "low");
        assert!(json["after10th"].is_null());
    }
}
