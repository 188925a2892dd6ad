//! Recommendation resolution: AI first, static catalog as the fallback.

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::StaticCareerCatalog;
use crate::models::career::CareerRecord;
use crate::models::profile::UserProfile;
use crate::recommendation::advisor::CareerAdvisor;
use crate::recommendation::default_engine::recommend;

/// Where the careers shown to the student came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationSource {
    #[serde(rename = "AI Recommendations")]
    Ai,
    #[serde(rename = "Default Recommendations (AI Fallback)")]
    DefaultFallback,
    #[serde(rename = "No Recommendations Available")]
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub source: RecommendationSource,
    pub careers: Vec<CareerRecord>,
}

/// Resolves careers for a profile. A `None` or empty AI result falls back to
/// the default engine; an empty fallback is reported as "no recommendations",
/// not as an error.
pub async fn resolve_recommendations(
    advisor: &CareerAdvisor,
    catalog: &StaticCareerCatalog,
    profile: &UserProfile,
    request_id: &str,
) -> RecommendationOutcome {
    if let Some(careers) = advisor.get_recommendations(profile, request_id).await {
        if !careers.is_empty() {
            info!(request_id, "AI recommendations successful");
            return RecommendationOutcome {
                source: RecommendationSource::Ai,
                careers,
            };
        }
    }

    warn!(
        request_id,
        "AI recommendations failed or returned empty, falling back to default"
    );
    let careers = recommend(catalog, profile);
    if careers.is_empty() {
        warn!(request_id, "No default recommendations available");
        return RecommendationOutcome {
            source: RecommendationSource::Unavailable,
            careers,
        };
    }

    info!(request_id, count = careers.len(), "Default recommendations used");
    RecommendationOutcome {
        source: RecommendationSource::DefaultFallback,
        careers,
    }
}
