use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::{
    distance::{Coordinates, CoordinateError, Proximity},
    embedding::{EmbeddingError, EmbeddingProvider},
    scoring::{composite_score, round_to, validate_max_distance, validate_weights, EngineConfigError},
    similarity::{cosine_similarity, SimilarityError},
};
use crate::models::{Job, MatchResult, Professional, ScoringWeights};

/// Default radius beyond which the distance score is 0
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// Default number of results returned
pub const DEFAULT_TOP_N: usize = 5;

/// Default composite score threshold
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// Why a single candidate was skipped
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error("malformed coordinates: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error("score is not a finite number")]
    NonFiniteScore,
}

/// Unrounded scores for one candidate
#[derive(Debug, Clone, Copy)]
struct CandidateScore {
    score: f64,
    similarity: f64,
    distance_score: f64,
    distance_km: Option<f64>,
}

/// Ranks professionals for a job by semantic similarity and proximity
///
/// # Pipeline
/// 1. Embed the job once
/// 2. Per candidate: embed, cosine similarity, distance score
/// 3. Blend with the configured weights
/// 4. Drop scores under the threshold, sort descending, take top N
///
/// The engine keeps no state between calls. Weights and radius are checked
/// once in [`MatchingEngine::new`] and never change afterwards.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    weights: ScoringWeights,
    max_distance_km: f64,
    embeddings: Arc<EmbeddingProvider>,
}

impl MatchingEngine {
    pub fn new(
        weights: ScoringWeights,
        max_distance_km: f64,
        embeddings: Arc<EmbeddingProvider>,
    ) -> Result<Self, EngineConfigError> {
        validate_weights(&weights)?;
        validate_max_distance(max_distance_km)?;

        info!(
            "Initialized MatchingEngine with weights: similarity={}, distance={}, experience={}, rating={}, rate={}, max_distance={}km",
            weights.similarity,
            weights.distance,
            weights.experience,
            weights.rating,
            weights.rate,
            max_distance_km
        );

        Ok(Self {
            weights,
            max_distance_km,
            embeddings,
        })
    }

    pub fn with_default_weights(embeddings: Arc<EmbeddingProvider>) -> Result<Self, EngineConfigError> {
        Self::new(ScoringWeights::default(), DEFAULT_MAX_DISTANCE_KM, embeddings)
    }

    /// Same weights and provider, different radius
    pub fn with_max_distance_km(&self, max_distance_km: f64) -> Result<Self, EngineConfigError> {
        validate_max_distance(max_distance_km)?;
        Ok(Self {
            max_distance_km,
            ..self.clone()
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    pub fn embeddings(&self) -> &Arc<EmbeddingProvider> {
        &self.embeddings
    }

    /// Rank `candidates` for `job`
    ///
    /// # Arguments
    /// * `job` - The job to match against
    /// * `candidates` - Professionals to consider
    /// * `top_n` - Maximum number of matches to return
    /// * `min_score` - Composite score threshold (inclusive)
    ///
    /// # Returns
    /// Matches sorted by score, descending. Ties keep input order. Failures
    /// never escape: an unusable job yields an empty list, an unusable
    /// candidate is logged and left out.
    pub fn find_matches(
        &self,
        job: &Job,
        candidates: &[Professional],
        top_n: usize,
        min_score: f64,
    ) -> Vec<MatchResult> {
        if candidates.is_empty() {
            debug!("No professionals provided for job {}", job.id);
            return Vec::new();
        }

        info!(
            "Matching job {} ('{}') against {} professionals",
            job.id,
            job.title,
            candidates.len()
        );

        let job_embedding = match self.embeddings.embed_job(job) {
            Ok(embedding) => embedding,
            Err(e) => {
                error!("Error generating embedding for job {}: {}", job.id, e);
                return Vec::new();
            }
        };

        let job_location = match Coordinates::from_pair(job.latitude, job.longitude) {
            Ok(location) => location,
            Err(e) => {
                warn!(
                    "Job {} has malformed coordinates ({}), using neutral distance score",
                    job.id, e
                );
                None
            }
        };

        let mut matches: Vec<MatchResult> = candidates
            .iter()
            .filter_map(|professional| {
                match self.score_candidate(&job_embedding, job_location.as_ref(), professional) {
                    Ok(scored) if scored.score >= min_score => Some(MatchResult {
                        professional_id: professional.id,
                        score: round_to(scored.score, 3),
                        similarity: round_to(scored.similarity, 3),
                        distance_score: round_to(scored.distance_score, 3),
                        distance_km: scored.distance_km.map(|d| round_to(d, 2)),
                    }),
                    Ok(scored) => {
                        debug!(
                            "Professional {} below threshold ({:.3} < {})",
                            professional.id, scored.score, min_score
                        );
                        None
                    }
                    Err(e) => {
                        warn!("Error processing professional {}: {}", professional.id, e);
                        None
                    }
                }
            })
            .collect();

        let qualified = matches.len();

        // stable: equal scores keep input order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_n);

        info!(
            "Found {} matches for job {} (min_score={}), returning {}",
            qualified,
            job.id,
            min_score,
            matches.len()
        );

        matches
    }

    fn score_candidate(
        &self,
        job_embedding: &[f32],
        job_location: Option<&Coordinates>,
        professional: &Professional,
    ) -> Result<CandidateScore, CandidateError> {
        let embedding = self.embeddings.embed_professional(professional)?;
        let similarity = cosine_similarity(job_embedding, &embedding)?;

        let location = Coordinates::from_pair(professional.latitude, professional.longitude)?;
        let proximity = Proximity::between(job_location, location.as_ref());
        let distance_score = proximity.score(self.max_distance_km);

        let score = composite_score(similarity, distance_score, &self.weights);
        if !score.is_finite() {
            return Err(CandidateError::NonFiniteScore);
        }

        Ok(CandidateScore {
            score,
            similarity,
            distance_score,
            distance_km: proximity.distance_km(),
        })
    }
}
