use std::path::PathBuf;

use crate::constants::DEFAULT_MAX_SEQ_LEN;

/// Max tokens per (query, candidate) pair fed to the cross-encoder.
pub const MAX_SEQ_LEN: usize = DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Directory with `config.json`, `model.safetensors`, `tokenizer.json`.
    /// `None` selects the deterministic stub backend.
    pub model_path: Option<PathBuf>,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self { model_path: None }
    }
}

impl RerankerConfig {
    /// Env var used to locate the reranker model directory.
    pub const ENV_MODEL_PATH: &'static str = "LEXRISK_RERANKER_PATH";

    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
        }
    }

    pub fn stub() -> Self {
        Self { model_path: None }
    }

    pub fn from_env() -> Self {
        let model_path = std::env::var(Self::ENV_MODEL_PATH)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self { model_path }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }
        Ok(())
    }
}
