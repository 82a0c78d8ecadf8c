//! Text embedding behind a lazily-initialized, shared model.
//!
//! The engine never talks to a model directly. It asks an [`EmbeddingProvider`]
//! for vectors; the provider builds its [`TextEmbedder`] on first use and
//! reuses it for every later call. Concurrent first callers block on the same
//! initialization instead of loading the model twice.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use siphasher::sip::SipHasher13;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EmbeddingSettings;
use crate::models::{Job, Professional};

/// Default dimension for the hashing backend
pub const DEFAULT_HASHING_DIMENSION: usize = 512;

// Changing these keys changes every hashed embedding.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("text produced no tokens: {0:?}")]
    NoTokens(String),

    #[error("unknown embedding backend: {0}")]
    UnknownBackend(String),

    #[error("embedding backend '{0}' requires the `semantic-model` feature")]
    BackendUnavailable(String),

    #[error("failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A text-embedding model: text in, fixed-length vector out
///
/// Implementations must return vectors of the same length for every input
/// over the lifetime of the instance.
pub trait TextEmbedder: Send + Sync {
    /// Short backend name for logs ("hashing", "minilm", ...)
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Deterministic feature-hashing embedder
///
/// Each lowercase word and each of its boundary-marked character trigrams is
/// hashed (SipHash13, fixed keys) into a signed bucket; the result is
/// L2-normalized. Trigrams let "plumber" and "plumbing" share mass. No model
/// files, no network, stable across Rust versions.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let h = Self::hash(feature);
        let idx = (h % self.dimension as u64) as usize;
        // top bit decides the sign so collisions tend to cancel out
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSION)
    }
}

impl TextEmbedder for HashingEmbedder {
    fn name(&self) -> &'static str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut features = 0usize;

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            self.add_feature(&mut vector, &format!("w:{}", word), WORD_WEIGHT);
            features += 1;

            let marked: Vec<char> = format!("#{}#", word).chars().collect();
            for gram in marked.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &format!("c:{}", gram), TRIGRAM_WEIGHT);
            }
        }

        if features == 0 {
            return Err(EmbeddingError::NoTokens(text.to_string()));
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }
}

/// Which model the provider should build on first use
#[derive(Clone)]
pub enum EmbeddingBackend {
    Hashing { dimension: usize },
    MiniLm { model_id: String },
    Custom(Arc<dyn TextEmbedder>),
}

impl fmt::Debug for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::Hashing { dimension } => {
                f.debug_struct("Hashing").field("dimension", dimension).finish()
            }
            EmbeddingBackend::MiniLm { model_id } => {
                f.debug_struct("MiniLm").field("model_id", model_id).finish()
            }
            EmbeddingBackend::Custom(model) => f.debug_tuple("Custom").field(&model.name()).finish(),
        }
    }
}

impl EmbeddingBackend {
    fn load(&self) -> Result<Arc<dyn TextEmbedder>, EmbeddingError> {
        match self {
            EmbeddingBackend::Hashing { dimension } => Ok(Arc::new(HashingEmbedder::new(*dimension))),
            EmbeddingBackend::MiniLm { model_id } => load_minilm(model_id),
            EmbeddingBackend::Custom(model) => Ok(Arc::clone(model)),
        }
    }
}

impl TryFrom<&EmbeddingSettings> for EmbeddingBackend {
    type Error = EmbeddingError;

    fn try_from(settings: &EmbeddingSettings) -> Result<Self, Self::Error> {
        match settings.backend.to_lowercase().as_str() {
            "hashing" | "hash" => Ok(EmbeddingBackend::Hashing {
                dimension: settings.dimension,
            }),
            "minilm" => Ok(EmbeddingBackend::MiniLm {
                model_id: settings.model_id.clone(),
            }),
            other => Err(EmbeddingError::UnknownBackend(other.to_string())),
        }
    }
}

#[cfg(feature = "semantic-model")]
fn load_minilm(model_id: &str) -> Result<Arc<dyn TextEmbedder>, EmbeddingError> {
    Ok(Arc::new(super::semantic::MiniLmEmbedder::load(model_id)?))
}

#[cfg(not(feature = "semantic-model"))]
fn load_minilm(_model_id: &str) -> Result<Arc<dyn TextEmbedder>, EmbeddingError> {
    Err(EmbeddingError::BackendUnavailable("minilm".to_string()))
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn TextEmbedder>, EmbeddingError> + Send + Sync>;

static SHARED: OnceCell<Arc<EmbeddingProvider>> = OnceCell::new();

/// Load-once, reuse-many access to a [`TextEmbedder`]
pub struct EmbeddingProvider {
    loader: Loader,
    model: OnceCell<Arc<dyn TextEmbedder>>,
}

impl fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("model", &self.model.get().map(|m| m.name()))
            .finish()
    }
}

impl EmbeddingProvider {
    pub fn new(backend: EmbeddingBackend) -> Self {
        Self::from_loader(move || backend.load())
    }

    /// Provider whose model is built by `loader` on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn from_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEmbedder>, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    pub fn with_embedder(model: Arc<dyn TextEmbedder>) -> Self {
        Self::new(EmbeddingBackend::Custom(model))
    }

    /// The process-wide provider.
    ///
    /// The first successful call fixes the backend; later calls return the
    /// same instance and ignore their `settings`.
    pub fn shared(settings: &EmbeddingSettings) -> Result<Arc<EmbeddingProvider>, EmbeddingError> {
        SHARED
            .get_or_try_init(|| {
                let backend = EmbeddingBackend::try_from(settings)?;
                info!("Configured shared embedding provider: {:?}", backend);
                Ok(Arc::new(EmbeddingProvider::new(backend)))
            })
            .map(Arc::clone)
    }

    fn model(&self) -> Result<&Arc<dyn TextEmbedder>, EmbeddingError> {
        self.model.get_or_try_init(|| {
            let model = (self.loader)()?;
            info!(
                "Embedding model ready: {} (dim={})",
                model.name(),
                model.dimension()
            );
            Ok(model)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Force model initialization ahead of the first request
    pub fn warmup(&self) -> Result<(), EmbeddingError> {
        self.model().map(|_| ())
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let vector = self.model()?.encode(text)?;
        debug!("Embedded {} chars into {} dims", text.len(), vector.len());
        Ok(vector)
    }

    pub fn embed_job(&self, job: &Job) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(&job_text(job))
    }

    pub fn embed_professional(&self, professional: &Professional) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(&professional_text(professional))
    }
}

/// Text used to embed a job: title, description and profession
pub fn job_text(job: &Job) -> String {
    format!("{} {} {}", job.title, job.description, job.profession)
}

/// Text used to embed a professional
///
/// Skills are a set: trimmed, blanks dropped, sorted and de-duplicated before
/// joining. With no skills the profession label stands in.
pub fn professional_text(professional: &Professional) -> String {
    let skills: BTreeSet<&str> = professional
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if skills.is_empty() {
        professional.profession.clone()
    } else {
        skills.into_iter().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::similarity::cosine_similarity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn professional(skills: &[&str], profession: &str) -> Professional {
        Professional {
            id: 1,
            profession: profession.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let a = embedder.encode("pipe repair").unwrap();
        let b = embedder.encode("pipe repair").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_HASHING_DIMENSION);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "L2 norm should be 1.0, got {}", norm);
    }

    #[test]
    fn hashing_ranks_related_text_higher() {
        let embedder = HashingEmbedder::default();
        let job = embedder.encode("Need a plumber for pipe repair").unwrap();
        let plumber = embedder.encode("plumbing pipe repair").unwrap();
        let electrician = embedder.encode("wiring").unwrap();

        let related = cosine_similarity(&job, &plumber).unwrap();
        let unrelated = cosine_similarity(&job, &electrician).unwrap();
        assert!(related > unrelated, "related={} unrelated={}", related, unrelated);
        assert!(related > 0.3);
    }

    #[test]
    fn punctuation_only_text_has_no_tokens() {
        let embedder = HashingEmbedder::default();
        assert!(matches!(embedder.encode("!!! ---"), Err(EmbeddingError::NoTokens(_))));
    }

    #[test]
    fn provider_rejects_blank_text() {
        let provider = EmbeddingProvider::new(EmbeddingBackend::Hashing { dimension: 64 });
        assert!(matches!(provider.embed("   "), Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn professional_text_ignores_skill_order() {
        let a = professional(&["pipe repair", "plumbing"], "Plumber");
        let b = professional(&[" plumbing", "pipe repair", "plumbing", ""], "Plumber");
        assert_eq!(professional_text(&a), professional_text(&b));
        assert_eq!(professional_text(&a), "pipe repair plumbing");
    }

    #[test]
    fn professional_text_falls_back_to_profession() {
        let p = professional(&["", "  "], "Electrician");
        assert_eq!(professional_text(&p), "Electrician");
    }

    #[test]
    fn job_text_concatenates_fields() {
        let job = Job {
            id: 7,
            title: "Leaky sink".to_string(),
            description: "need a plumber".to_string(),
            profession: "Plumber".to_string(),
            latitude: None,
            longitude: None,
        };
        assert_eq!(job_text(&job), "Leaky sink need a plumber Plumber");
    }

    #[test]
    fn model_is_initialized_once_under_concurrent_first_use() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let provider = Arc::new(EmbeddingProvider::from_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(HashingEmbedder::new(32)) as Arc<dyn TextEmbedder>)
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || provider.embed(&format!("text {}", i)).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(provider.is_loaded());
    }

    #[test]
    fn failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = EmbeddingProvider::from_loader(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(EmbeddingError::ModelLoad("offline".to_string()))
            } else {
                Ok(Arc::new(HashingEmbedder::new(16)) as Arc<dyn TextEmbedder>)
            }
        });

        assert!(provider.embed("hello").is_err());
        assert!(!provider.is_loaded());
        assert!(provider.embed("hello").is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backend_from_settings() {
        let mut settings = EmbeddingSettings::default();
        settings.backend = "hashing".to_string();
        assert!(matches!(
            EmbeddingBackend::try_from(&settings),
            Ok(EmbeddingBackend::Hashing { .. })
        ));

        settings.backend = "word2vec".to_string();
        assert!(matches!(
            EmbeddingBackend::try_from(&settings),
            Err(EmbeddingError::UnknownBackend(_))
        ));
    }

    #[test]
    fn shared_provider_is_a_singleton() {
        let first = EmbeddingProvider::shared(&EmbeddingSettings::default()).unwrap();

        let mut other = EmbeddingSettings::default();
        other.dimension = 16;
        let second = EmbeddingProvider::shared(&other).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[cfg(not(feature = "semantic-model"))]
    #[test]
    fn minilm_without_feature_fails_softly() {
        let provider = EmbeddingProvider::new(EmbeddingBackend::MiniLm {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        });
        assert!(matches!(
            provider.embed("anything"),
            Err(EmbeddingError::BackendUnavailable(_))
        ));
    }
}
