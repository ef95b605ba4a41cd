//! Candle BERT wrappers for the clause encoder and the cross-encoder.

use candle_core::{DType, Device, IndexOp, Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

fn load_bert(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    // Checkpoints exported from different trainers prefix tensors
    // differently; probe the common layouts.
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

fn load_parts(model_dir: &Path, device: &Device) -> Result<(VarBuilder<'static>, Config)> {
    let config_path = model_dir.join("config.json");
    let weights_path = model_dir.join("model.safetensors");

    let config_content = std::fs::read_to_string(config_path)?;
    let config: Config = serde_json::from_str(&config_content)
        .map_err(|e| candle_core::Error::Msg(format!("failed to parse BERT config: {}", e)))?;

    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

    Ok((vb, config))
}

/// Sentence encoder: BERT followed by attention-masked mean pooling.
#[derive(Clone)]
pub struct BertSentenceEncoder {
    inner: Arc<BertModel>,
    hidden_size: usize,
}

impl BertSentenceEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let (vb, config) = load_parts(model_dir.as_ref(), device)?;
        let bert = load_bert(&vb, &config)?;
        Ok(Self {
            inner: Arc::new(bert),
            hidden_size: config.hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Runs the encoder and mean-pools token states over the attention
    /// mask. Returns a `[batch, hidden]` tensor.
    pub fn forward_pooled(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .inner
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        // [b, t] -> [b, t, 1] broadcast over the hidden dimension.
        let mask = attention_mask
            .to_dtype(DType::F32)?
            .unsqueeze(2)?
            .broadcast_as(hidden.shape())?;

        let summed = hidden.mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f32::MAX)?;
        summed.div(&counts)
    }
}

/// Cross-encoder: BERT with a single-logit classification head on the CLS
/// token. Output is a raw relevance logit; calibration happens downstream.
#[derive(Clone)]
pub struct BertCrossEncoder {
    inner: Arc<CrossEncoderImpl>,
}

struct CrossEncoderImpl {
    bert: BertModel,
    classifier: Linear,
}

impl BertCrossEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let (vb, config) = load_parts(model_dir.as_ref(), device)?;
        let bert = load_bert(&vb, &config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self {
            inner: Arc::new(CrossEncoderImpl { bert, classifier }),
        })
    }

    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let hidden = self
            .inner
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls = hidden.i((.., 0, ..))?;
        self.inner.classifier.forward(&cls)
    }
}
