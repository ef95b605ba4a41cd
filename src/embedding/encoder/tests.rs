use super::*;

fn stub_encoder() -> ClauseEncoder {
    ClauseEncoder::stub().expect("stub encoder")
}

mod config_tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;

    #[test]
    fn default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.embedding_dim, crate::constants::DEFAULT_EMBEDDING_DIM);
        assert_eq!(config.max_seq_len, crate::constants::DEFAULT_MAX_SEQ_LEN);
        assert!(!config.testing_stub);
        assert!(config.model_path.as_os_str().is_empty());
    }

    #[test]
    fn stub_config_validates() {
        assert!(EncoderConfig::stub().validate().is_ok());
    }

    #[test]
    fn empty_path_without_stub_rejected() {
        let config = EncoderConfig::default();
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn missing_model_dir_rejected() {
        let config = EncoderConfig::new("/nonexistent/encoder-model");
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn zero_embedding_dim_rejected() {
        let config = EncoderConfig::stub().with_embedding_dim(0);
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    #[serial]
    fn from_env_reads_model_path() {
        unsafe {
            std::env::set_var(EncoderConfig::ENV_MODEL_PATH, "/models/encoder");
        }
        let config = EncoderConfig::from_env();
        unsafe {
            std::env::remove_var(EncoderConfig::ENV_MODEL_PATH);
        }
        assert_eq!(config.model_path, PathBuf::from("/models/encoder"));
    }
}

#[test]
fn stub_embeddings_are_deterministic() {
    let encoder = stub_encoder();
    let a = encoder.embed("Either party may terminate this Agreement.").unwrap();
    let b = encoder.embed("Either party may terminate this Agreement.").unwrap();
    assert_eq!(a, b);
}

#[test]
fn stub_embeddings_differ_for_different_text() {
    let encoder = stub_encoder();
    let a = encoder.embed("termination for convenience").unwrap();
    let b = encoder.embed("limitation of liability").unwrap();
    assert_ne!(a, b);
}

#[test]
fn embeddings_are_unit_norm() {
    let encoder = stub_encoder();
    let v = encoder.embed("The Employee shall not compete.").unwrap();
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
}

#[test]
fn batch_matches_single() {
    let encoder = stub_encoder();
    let texts = ["clause one text", "clause two text", "clause three text"];
    let batch = encoder.embed_batch(&texts).unwrap();
    for (text, batched) in texts.iter().zip(&batch) {
        assert_eq!(&encoder.embed(text).unwrap(), batched);
    }
}

#[test]
fn dual_embedding_primary_differs_from_context() {
    let encoder = stub_encoder();
    let dual = encoder.embed_dual("governing law of the State of Delaware").unwrap();
    assert_ne!(dual.primary, dual.context);
    assert_eq!(dual.primary.len(), encoder.embedding_dim());
    assert_eq!(dual.context.len(), encoder.embedding_dim());
}

#[test]
fn query_vector_is_primary_then_context() {
    let encoder = stub_encoder();
    let dual = encoder.embed_dual("indemnification obligations").unwrap();
    let query = dual.query_vector();
    assert_eq!(query.len(), encoder.query_dim());
    assert_eq!(&query[..dual.primary.len()], dual.primary.as_slice());
    assert_eq!(&query[dual.primary.len()..], dual.context.as_slice());
}

#[test]
fn dual_batch_matches_single_dual() {
    let encoder = stub_encoder();
    let texts = ["first clause body", "second clause body"];
    let batch = encoder.embed_dual_batch(&texts).unwrap();
    assert_eq!(batch.len(), 2);
    for (text, batched) in texts.iter().zip(&batch) {
        assert_eq!(&encoder.embed_dual(text).unwrap(), batched);
    }
}
