use actix_web::{web, HttpResponse, Responder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{EmbeddingError, MatchingEngine};
use crate::models::{
    CandidateQuery, HealthResponse, Professional, Recommendation, RecommendationQuery,
    RecommendationsResponse, SuggestionsResponse,
};
use crate::routes::error::ApiError;
use crate::services::JobRepository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn JobRepository>,
    pub engine: MatchingEngine,
    pub matching: MatchingSettings,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/jobs/{job_id}/recommendations", web::get().to(get_recommendations))
        .route("/jobs/{job_id}/suggestions", web::get().to(get_suggestions));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = match state.repository.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_healthy,
        model_loaded: state.engine.embeddings().is_loaded(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend professionals for a job
///
/// GET /api/v1/jobs/{job_id}/recommendations?max_distance=50&min_rating=0&limit=10
///
/// Loads the job and the available professionals, ranks them, replaces the
/// job's stored suggestions with the new ranking and returns it.
async fn get_recommendations(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<RecommendationQuery>,
) -> Result<HttpResponse, ApiError> {
    let job_id = path.into_inner();
    let query = query.into_inner();
    let request_id = uuid::Uuid::new_v4();

    recommend(state, job_id, query)
        .instrument(tracing::info_span!("recommendations", %request_id, job_id))
        .await
}

async fn recommend(
    state: web::Data<AppState>,
    job_id: i64,
    query: RecommendationQuery,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for recommendations query: {:?}", errors);
        return Err(ApiError::Validation(errors.to_string()));
    }

    let max_distance = query.max_distance.unwrap_or(state.matching.max_distance_km);
    let min_rating = query.min_rating.unwrap_or(0.0);
    let limit = query
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;
    let min_score = state.matching.min_score;

    let job = state
        .repository
        .get_job(job_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch job {}: {}", job_id, e);
            ApiError::Internal("Failed to fetch job")
        })?
        .ok_or(ApiError::JobNotFound(job_id))?;

    if !job.has_location() {
        return Err(ApiError::JobLocationMissing);
    }

    let engine = state
        .engine
        .with_max_distance_km(max_distance)
        .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;

    let candidates = state
        .repository
        .list_candidates(&CandidateQuery { min_rating })
        .await
        .map_err(|e| {
            tracing::error!("Failed to query candidates for job {}: {}", job_id, e);
            ApiError::Internal("Failed to generate recommendations")
        })?;

    tracing::debug!(
        "Found {} candidates for job {} (min_rating={}, max_distance={}km)",
        candidates.len(),
        job_id,
        min_rating,
        max_distance
    );

    // embedding inference is CPU-bound; keep it off the async workers.
    // A model that cannot load is a server error, never an empty ranking.
    let (job, candidates, matches) = web::block(move || {
        engine.embeddings().warmup()?;
        let matches = engine.find_matches(&job, &candidates, limit, min_score);
        Ok::<_, EmbeddingError>((job, candidates, matches))
    })
    .await
    .map_err(|e| {
        tracing::error!("Matching task failed for job {}: {}", job_id, e);
        ApiError::Internal("Failed to generate recommendations")
    })?
    .map_err(|e| {
        tracing::error!("Embedding model unavailable for job {}: {}", job_id, e);
        ApiError::Internal("Failed to generate recommendations")
    })?;

    // suggestions are a convenience copy; a write failure must not fail the request
    if let Err(e) = state.repository.replace_suggestions(job.id, &matches).await {
        tracing::warn!("Failed to store suggestions for job {}: {}", job.id, e);
    }

    let by_id: HashMap<i64, &Professional> = candidates.iter().map(|p| (p.id, p)).collect();
    let recommendations: Vec<Recommendation> = matches
        .iter()
        .filter_map(|m| by_id.get(&m.professional_id).map(|p| Recommendation::new(p, m)))
        .collect();

    let message = candidates
        .is_empty()
        .then(|| "No professionals found matching the criteria".to_string());

    tracing::info!(
        "Returning {} recommendations for job {} (from {} candidates)",
        recommendations.len(),
        job.id,
        candidates.len()
    );

    Ok(HttpResponse::Ok().json(RecommendationsResponse {
        job_id: job.id,
        job_title: job.title,
        total_recommendations: recommendations.len(),
        recommendations,
        message,
    }))
}

/// Stored suggestions for a job
///
/// GET /api/v1/jobs/{job_id}/suggestions
async fn get_suggestions(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let job_id = path.into_inner();

    let job = state.repository.get_job(job_id).await.map_err(|e| {
        tracing::error!("Failed to fetch job {}: {}", job_id, e);
        ApiError::Internal("Failed to fetch job")
    })?;
    if job.is_none() {
        return Err(ApiError::JobNotFound(job_id));
    }

    let suggestions = state.repository.list_suggestions(job_id).await.map_err(|e| {
        tracing::error!("Failed to fetch suggestions for job {}: {}", job_id, e);
        ApiError::Internal("Failed to fetch suggestions")
    })?;

    Ok(HttpResponse::Ok().json(SuggestionsResponse { job_id, suggestions }))
}
