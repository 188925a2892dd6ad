//! Career Search Engine: keyword relevance over every catalog record.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::StaticCareerCatalog;
use crate::models::career::CareerRecord;

// ─── Scoring weights ─────────────────────────────────────────────────────────

const EXACT_TITLE_SCORE: u32 = 100;
const TITLE_PHRASE: u32 = 50;
const TITLE_TERM: u32 = 30;
const DESCRIPTION_PHRASE: u32 = 25;
const DESCRIPTION_TERM: u32 = 15;
const REQUIREMENTS_PHRASE: u32 = 20;
const REQUIREMENTS_TERM: u32 = 10;
const SKILLS_PHRASE: u32 = 25;
const SKILLS_TERM: u32 = 15;

/// Records scoring at or below this are left out, unless the title matched exactly.
const MIN_SCORE: u32 = 10;
/// Terms this short or shorter carry no weight on their own.
const MIN_TERM_LEN: usize = 2;

/// A catalog record with its relevance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCareer {
    #[serde(flatten)]
    pub career: CareerRecord,
    pub relevance_score: u32,
    #[serde(skip)]
    pub exact_title: bool,
}

/// Searches the whole catalog.
///
/// Exact title matches always come first, then everything else by score
/// descending. Ties keep catalog order. A blank query finds nothing.
pub fn search(catalog: &StaticCareerCatalog, query: &str) -> Vec<ScoredCareer> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let terms: Vec<&str> = query
        .split_whitespace()
        .filter(|term| term.chars().count() > MIN_TERM_LEN)
        .collect();

    let mut results: Vec<ScoredCareer> = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for career in catalog.all_records() {
        let Some(scored) = score(career, &query, &terms) else {
            continue;
        };
        match by_title.get(&career.title) {
            Some(&index) => {
                if rank_key(&scored) > rank_key(&results[index]) {
                    results[index] = scored;
                }
            }
            None => {
                by_title.insert(career.title.clone(), results.len());
                results.push(scored);
            }
        }
    }

    results.sort_by(|a, b| rank_key(b).cmp(&rank_key(a)));
    results
}

fn rank_key(scored: &ScoredCareer) -> (bool, u32) {
    (scored.exact_title, scored.relevance_score)
}

/// `None` when the record is not relevant enough to show.
fn score(career: &CareerRecord, query: &str, terms: &[&str]) -> Option<ScoredCareer> {
    let title = career.title.to_lowercase();
    if title == query {
        return Some(ScoredCareer {
            career: career.clone(),
            relevance_score: EXACT_TITLE_SCORE,
            exact_title: true,
        });
    }

    let total = field_score(&title, query, terms, TITLE_PHRASE, TITLE_TERM)
        + field_score(
            &career.description.to_lowercase(),
            query,
            terms,
            DESCRIPTION_PHRASE,
            DESCRIPTION_TERM,
        )
        + field_score(
            &career.requirements.joined().to_lowercase(),
            query,
            terms,
            REQUIREMENTS_PHRASE,
            REQUIREMENTS_TERM,
        )
        + field_score(
            &career.skills.join(" ").to_lowercase(),
            query,
            terms,
            SKILLS_PHRASE,
            SKILLS_TERM,
        );

    (total > MIN_SCORE).then(|| ScoredCareer {
        career: career.clone(),
        relevance_score: total,
        exact_title: false,
    })
}

/// Full-phrase hit scores once; otherwise every matching term scores.
fn field_score(text: &str, query: &str, terms: &[&str], phrase: u32, per_term: u32) -> u32 {
    if text.contains(query) {
        return phrase;
    }
    let hits = terms.iter().filter(|term| text.contains(**term)).count() as u32;
    hits * per_term
}
