use serde::{Deserialize, Serialize};

/// A professional offering services (read-only input to the engine)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Professional {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    pub profession: String,
    /// Treated as a set; order and duplicates don't matter
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool { true }

/// A job posting looking for a professional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub profession: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Job {
    /// Both coordinates present
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// One ranked candidate with its score breakdown
///
/// Scores are rounded to 3 decimal places, `distance_km` to 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub professional_id: i64,
    pub score: f64,
    pub similarity: f64,
    pub distance_score: f64,
    pub distance_km: Option<f64>,
}

/// A persisted recommendation for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub job_id: i64,
    pub professional_id: i64,
    pub score: f64,
    pub similarity_score: f64,
    pub distance_score: f64,
    pub distance_km: Option<f64>,
    pub is_contacted: bool,
    pub is_interested: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Candidate query parameters
///
/// Only available professionals are ever returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateQuery {
    pub min_rating: f64,
}

impl CandidateQuery {
    pub fn matches(&self, professional: &Professional) -> bool {
        professional.is_available && professional.rating >= self.min_rating
    }
}

/// Scoring weights
///
/// Only `similarity` and `distance` feed the composite score today; the other
/// three are validated and carried so they can join the formula later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub distance: f64,
    pub experience: f64,
    pub rating: f64,
    pub rate: f64,
}

impl ScoringWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [self.similarity, self.distance, self.experience, self.rating, self.rate]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.5,
            distance: 0.2,
            experience: 0.1,
            rating: 0.1,
            rate: 0.1,
        }
    }
}
