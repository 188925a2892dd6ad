//! Default Recommendation Engine: deterministic filter/sort over the static
//! catalog, used whenever the AI path comes back empty.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::catalog::StaticCareerCatalog;
use crate::models::career::{CareerRecord, PathType};
use crate::models::profile::{HigherStudies, UserProfile};

/// Maximum number of careers handed back to a caller.
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Ranks the profile's catalog bucket.
///
/// Algorithm:
/// 1. Take the profile's bucket
/// 2. `higherStudies = Yes` keeps `higher_education`, `No` keeps `immediate`
/// 3. With interests: careers whose title or description mention an interest
///    come first, then by `salary_max` descending; without interests just
///    `salary_max` descending (stable either way)
/// 4. Drop repeated titles, keeping the best-ranked one, and cap at 6
pub fn recommend(catalog: &StaticCareerCatalog, profile: &UserProfile) -> Vec<CareerRecord> {
    let mut careers: Vec<&CareerRecord> = catalog
        .bucket(profile)
        .iter()
        .filter(|career| match profile.higher_studies {
            Some(HigherStudies::Yes) => career.path_type == PathType::HigherEducation,
            Some(HigherStudies::No) => career.path_type == PathType::Immediate,
            None => true,
        })
        .collect();

    if profile.interests.is_empty() {
        careers.sort_by(|a, b| b.salary_max.cmp(&a.salary_max));
    } else {
        let interests: Vec<String> = profile.interests.iter().map(|i| i.to_lowercase()).collect();
        careers.sort_by(|a, b| {
            let a_matches = matches_interest(a, &interests);
            let b_matches = matches_interest(b, &interests);
            match (a_matches, b_matches) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => b.salary_max.cmp(&a.salary_max),
            }
        });
    }

    let mut seen = HashSet::new();
    careers
        .into_iter()
        .filter(|career| seen.insert(career.title.as_str()))
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect()
}

/// Case-insensitive substring match of any interest against title or description.
fn matches_interest(career: &CareerRecord, interests: &[String]) -> bool {
    let title = career.title.to_lowercase();
    let description = career.description.to_lowercase();
    interests
        .iter()
        .any(|interest| title.contains(interest) || description.contains(interest))
}
