//! Sentence-transformer embeddings on candle.
//!
//! Loads a BERT-family sentence model (default `all-MiniLM-L6-v2`) from the
//! HuggingFace Hub and produces mean-pooled, L2-normalized vectors.

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use super::embedding::{EmbeddingError, TextEmbedder};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output width of MiniLM-L6
const MINILM_DIM: usize = 384;

/// MiniLM was trained on sequences up to 256 tokens
const MAX_SEQUENCE_LENGTH: usize = 256;

pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl MiniLmEmbedder {
    /// Download (or reuse the hub cache for) `model_id` and load it on CPU
    pub fn load(model_id: &str) -> Result<Self, EmbeddingError> {
        info!("Loading sentence model ({})...", model_id);

        let api = Api::new().map_err(|e| load_error("HuggingFace API unavailable", e))?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            "main".to_string(),
        ));

        let config_path = repo
            .get("config.json")
            .map_err(|e| load_error("failed to download config.json", e))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| load_error("failed to download tokenizer.json", e))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| load_error("failed to download model.safetensors", e))?;

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| load_error("failed to read config", e))?;
        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| load_error("failed to parse config", e))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| load_error("failed to load tokenizer", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| load_error("failed to configure truncation", e))?;
        tokenizer.with_padding(None);

        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .map_err(|e| load_error("failed to load weights", e))?
        };
        let model = BertModel::load(vb, &config).map_err(|e| load_error("failed to build model", e))?;

        info!("Sentence model loaded (dim={})", MINILM_DIM);

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn forward(&self, ids: &[u32], mask: &[u32]) -> candle_core::Result<Vec<f32>> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(mask, &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // mean pooling over non-padding tokens
        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let pooled = summed.broadcast_div(&mask.sum(1)?)?;

        let normalized = pooled.broadcast_div(&pooled.sqr()?.sum_keepdim(1)?.sqrt()?)?;
        normalized.squeeze(0)?.to_vec1::<f32>()
    }
}

impl TextEmbedder for MiniLmEmbedder {
    fn name(&self) -> &'static str {
        "minilm"
    }

    fn dimension(&self) -> usize {
        MINILM_DIM
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Inference(format!("tokenization failed: {}", e)))?;

        self.forward(encoding.get_ids(), encoding.get_attention_mask())
            .map_err(|e| EmbeddingError::Inference(format!("forward pass failed: {}", e)))
    }
}

fn load_error(context: &str, err: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::ModelLoad(format!("{}: {}", context, err))
}
