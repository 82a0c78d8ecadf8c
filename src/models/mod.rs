// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateQuery, Job, MatchResult, Professional, ScoringWeights, Suggestion};
pub use requests::{NearbyQuery, RecommendationQuery, DEFAULT_NEARBY_RADIUS_KM};
pub use responses::{
    ErrorResponse, HealthResponse, NearbyProfessional, NearbyProfessionalsResponse, Recommendation,
    RecommendationsResponse, SuggestionsResponse,
};
