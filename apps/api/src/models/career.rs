use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::profile::HigherStudies;

/// Whether a career needs further study first or is open right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    HigherEducation,
    Immediate,
}

impl PathType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "higher_education" => Some(Self::HigherEducation),
            "immediate" => Some(Self::Immediate),
            _ => None,
        }
    }

    /// The path type every AI-sourced career is forced to: `higher_education`
    /// only when the student explicitly wants higher studies.
    pub fn for_higher_studies(higher_studies: Option<HigherStudies>) -> Self {
        match higher_studies {
            Some(HigherStudies::Yes) => Self::HigherEducation,
            _ => Self::Immediate,
        }
    }
}

/// Entry requirements. The datasets use both a sentence and a list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirements {
    Text(String),
    List(Vec<String>),
}

impl Default for Requirements {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Requirements {
    /// Flattens the requirements into one space-separated string.
    pub fn joined(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(lines) => lines.join(" "),
        }
    }
}

/// A single career, either from the static catalog or from the AI model.
///
/// Instances are only ever built through [`CareerRecord::from_loose`], which
/// rejects anything without a title, description or path type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerRecord {
    pub title: String,
    pub description: String,
    pub requirements: Requirements,
    pub skills: Vec<String>,
    pub salary_range: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub path_type: PathType,
}

impl CareerRecord {
    /// Builds a record from a loosely shaped JSON object, coercing the fields
    /// that upstream sources get wrong:
    /// - `skills` given as a scalar becomes a one-element list (empty if falsy)
    /// - `salary_min` / `salary_max` given as strings are parsed best-effort, 0 on failure
    /// - `path_type_override` replaces whatever path type the source carried
    ///
    /// Returns `None` when title, description or path type is missing or empty.
    pub fn from_loose(value: &Value, path_type_override: Option<PathType>) -> Option<Self> {
        let object = value.as_object()?;

        let title = non_empty_str(object.get("title"))?;
        let description = non_empty_str(object.get("description"))?;
        let path_type = match path_type_override {
            Some(forced) => forced,
            None => object
                .get("path_type")
                .and_then(Value::as_str)
                .and_then(PathType::parse)?,
        };

        Some(Self {
            title,
            description,
            requirements: coerce_requirements(object.get("requirements")),
            skills: coerce_skills(object.get("skills")),
            salary_range: object
                .get("salary_range")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            salary_min: coerce_salary(object.get("salary_min")),
            salary_max: coerce_salary(object.get("salary_max")),
            path_type,
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn coerce_requirements(value: Option<&Value>) -> Requirements {
    match value {
        Some(Value::String(text)) => Requirements::Text(text.clone()),
        Some(Value::Array(items)) => Requirements::List(items.iter().map(value_to_text).collect()),
        Some(Value::Null) | None => Requirements::default(),
        Some(other) => Requirements::Text(value_to_text(other)),
    }
}

/// Lists pass through; a truthy scalar becomes `[String(scalar)]`; a falsy or
/// missing value becomes `[]`.
pub fn coerce_skills(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(v) if is_truthy(v) => vec![value_to_text(v)],
        _ => Vec::new(),
    }
}

/// Numbers are truncated to integers, strings are parsed from their leading
/// digits, everything else is 0.
pub fn coerce_salary(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_leading_int(s).unwrap_or(0),
        _ => 0,
    }
}

/// Parses an optional sign followed by leading ASCII digits, ignoring any
/// trailing text (`"15000 per month"` is 15000, `"₹15,000"` is not a number).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let parsed = digits.parse::<i64>().ok()?;
    Some(if negative { -parsed } else { parsed })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts a list of strings or a single string for list-shaped fields.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_skills(value.as_ref()))
}

/// Reads `null` the same as a missing string.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Known details about a career, passed along when asking for its roadmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
}

/// One stage of a career roadmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapStage {
    pub stage: String,
    pub duration: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub key_skills: Vec<String>,
    pub education: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub typical_roles: Vec<String>,
    pub salary_range: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub growth_tips: Vec<String>,
}

/// A multi-stage roadmap for one career. AI-sourced only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    pub summary: String,
    pub timeline: Vec<RoadmapStage>,
    pub learning_resources: Vec<Value>,
    pub industry_outlook: Map<String, Value>,
    pub local_relevance: String,
}
