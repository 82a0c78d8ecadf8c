// Core algorithm exports
pub mod distance;
pub mod embedding;
pub mod matcher;
pub mod scoring;
#[cfg(feature = "semantic-model")]
pub mod semantic;
pub mod similarity;

pub use distance::{great_circle_distance, haversine_distance, nearest_within, Coordinates, CoordinateError, Proximity, NEUTRAL_DISTANCE_SCORE};
pub use embedding::{EmbeddingBackend, EmbeddingError, EmbeddingProvider, HashingEmbedder, TextEmbedder};
pub use matcher::{CandidateError, MatchingEngine, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MIN_SCORE, DEFAULT_TOP_N};
pub use scoring::{composite_score, EngineConfigError};
pub use similarity::{cosine_similarity, SimilarityError};
