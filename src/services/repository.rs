use async_trait::async_trait;

use crate::models::{CandidateQuery, Job, MatchResult, Professional, Suggestion};
use crate::services::postgres::StoreError;

/// Storage the HTTP layer needs around the matching engine
///
/// The engine itself never touches storage: callers load the job and its
/// candidates, run the engine, then persist the results as suggestions.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn get_job(&self, job_id: i64) -> Result<Option<Job>, StoreError>;

    /// Available professionals with `rating >= query.min_rating`
    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<Professional>, StoreError>;

    /// Replace every stored suggestion for `job_id` with `matches`
    ///
    /// Returns the number of rows inserted.
    async fn replace_suggestions(&self, job_id: i64, matches: &[MatchResult]) -> Result<u64, StoreError>;

    async fn list_suggestions(&self, job_id: i64) -> Result<Vec<Suggestion>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
