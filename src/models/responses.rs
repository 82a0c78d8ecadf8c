use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, Professional, Suggestion};

/// One recommended professional with display fields and score breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
    pub profession: String,
    pub rating: f64,
    pub hourly_rate: Option<f64>,
    pub years_experience: u32,
    pub skills: Vec<String>,
    pub distance_km: Option<f64>,
    pub match_score: f64,
    pub similarity_score: f64,
    pub distance_score: f64,
}

impl Recommendation {
    pub fn new(professional: &Professional, result: &MatchResult) -> Self {
        Self {
            id: professional.id,
            name: professional.full_name.clone(),
            profession: professional.profession.clone(),
            rating: professional.rating,
            hourly_rate: professional.hourly_rate,
            years_experience: professional.years_experience,
            skills: professional.skills.clone(),
            distance_km: result.distance_km,
            match_score: result.score,
            similarity_score: result.similarity,
            distance_score: result.distance_score,
        }
    }
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub job_id: i64,
    pub job_title: String,
    pub total_recommendations: usize,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Persisted suggestions for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub job_id: i64,
    pub suggestions: Vec<Suggestion>,
}

/// A professional found by the radius search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyProfessional {
    pub id: i64,
    pub name: String,
    pub profession: String,
    pub rating: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Rounded to 2 decimal places
    pub distance_km: f64,
}

impl NearbyProfessional {
    pub fn new(professional: &Professional, distance_km: f64) -> Self {
        Self {
            id: professional.id,
            name: professional.full_name.clone(),
            profession: professional.profession.clone(),
            rating: professional.rating,
            latitude: professional.latitude,
            longitude: professional.longitude,
            distance_km: (distance_km * 100.0).round() / 100.0,
        }
    }
}

/// Response for the nearby professionals endpoint, nearest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyProfessionalsResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub total: usize,
    pub professionals: Vec<NearbyProfessional>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_healthy: bool,
    pub model_loaded: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
