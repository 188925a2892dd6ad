use std::sync::Arc;

use crate::catalog::StaticCareerCatalog;
use crate::middleware::cache::ResponseCache;
use crate::middleware::rate_limit::RateLimiter;
use crate::recommendation::advisor::CareerAdvisor;
use crate::roadmap::planner::RoadmapPlanner;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    pub catalog: Arc<StaticCareerCatalog>,
    pub advisor: CareerAdvisor,
    pub planner: RoadmapPlanner,
    pub cache: ResponseCache,
    pub rate_limiter: RateLimiter,
}
