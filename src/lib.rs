//! Promatch - job to professional matching service
//!
//! Ranks the professionals available for a job by blending the semantic
//! similarity of their profile text with their distance to the job site.
//! The [`core`] module holds the matching engine and has no I/O; [`routes`]
//! and [`services`] wrap it in an HTTP API backed by PostgreSQL.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{cosine_similarity, haversine_distance, EmbeddingProvider, MatchingEngine};
pub use models::{Job, MatchResult, Professional, ScoringWeights};
