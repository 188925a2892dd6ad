use crate::errors::FieldError;
use crate::models::profile::HigherStudies;
use crate::recommendation::normalizer::{RawProfileInput, RawScalar};

pub const MIN_AGE: i64 = 14;
pub const MAX_AGE: i64 = 25;
const INCOME_LEVELS: &[&str] = &["low", "medium", "high"];

/// Checks a recommendation request body before it is normalized.
/// Collects every problem instead of stopping at the first.
pub fn validate_recommendation_request(raw: &RawProfileInput) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if is_blank(raw.qualification.as_deref()) {
        errors.push(FieldError::new("qualification", "Qualification is required"));
    }

    match raw.age.as_ref().map(RawScalar::as_integer) {
        None => errors.push(FieldError::new("age", "Age is required")),
        Some(Some(age)) if (MIN_AGE..=MAX_AGE).contains(&age) => {}
        Some(_) => errors.push(FieldError::new(
            "age",
            format!("Age must be a whole number between {MIN_AGE} and {MAX_AGE}"),
        )),
    }

    if is_blank(raw.location.as_deref()) {
        errors.push(FieldError::new("location", "Location is required"));
    }

    if let Some(level) = raw.income_level.as_deref() {
        if !INCOME_LEVELS.contains(&level) {
            errors.push(FieldError::new(
                "incomeLevel",
                "Income level must be one of: low, medium, high",
            ));
        }
    }

    if let Some(higher) = &raw.higher_studies {
        if HigherStudies::from_raw(&higher.to_text()).is_none() {
            errors.push(FieldError::new(
                "higherStudies",
                "Higher studies must be Yes/No or a boolean",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}
