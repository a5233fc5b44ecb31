use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;
use ort::session::Session;
use serde::Deserialize;
use log::{info, error};

use super::error::ClassifierError;
use super::inference::SequenceClassification;
use super::model::OnnxSentimentModel;
use crate::{BuiltinModel, ModelManager, runtime::{RuntimeConfig, create_session_builder}};

/// Used when neither the caller nor the model says how long inputs may be
const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 512;

const SAMPLE_TEXT: &str = "Test input to infer the label count";

/// The subset of a Hugging Face `config.json` the builder cares about
#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: Option<HashMap<String, String>>,
}

/// Reads the index to label table out of a `config.json` document.
///
/// Returns `Ok(None)` when the document has no `id2label` entry. Keys must be
/// decimal indices covering `0..n` without gaps.
pub fn labels_from_config(json: &str) -> Result<Option<Vec<String>>, ClassifierError> {
    let config: ModelConfig = serde_json::from_str(json)
        .map_err(|e| ClassifierError::BuildError(format!("Invalid model config: {}", e)))?;

    let Some(id2label) = config.id2label else {
        return Ok(None);
    };
    if id2label.is_empty() {
        return Ok(None);
    }

    let mut indexed = id2label.into_iter()
        .map(|(key, label)| {
            key.parse::<usize>()
                .map(|index| (index, label))
                .map_err(|_| ClassifierError::BuildError(format!("Invalid id2label key '{}'", key)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(index, _)| *index);

    if indexed.iter().enumerate().any(|(position, (index, _))| position != *index) {
        return Err(ClassifierError::BuildError("id2label indices must cover 0..n without gaps".into()));
    }

    Ok(Some(indexed.into_iter().map(|(_, label)| label).collect()))
}

/// A builder for constructing an OnnxSentimentModel with a fluent interface.
#[derive(Default, Debug)]
pub struct OnnxSentimentModelBuilder {
    name: Option<String>,
    model_path: Option<String>,
    tokenizer_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    explicit_labels: Option<Vec<String>>,
    config_labels: Option<Vec<String>>,
    fallback_labels: Vec<String>,
    max_sequence_length: Option<usize>,
    runtime_config: RuntimeConfig,
    manager: Option<ModelManager>,
}

impl SequenceClassification for OnnxSentimentModelBuilder {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        self.tokenizer.as_ref()
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.max_sequence_length.unwrap_or(DEFAULT_MAX_SEQUENCE_LENGTH))
    }
}

impl OnnxSentimentModelBuilder {
    /// Creates a new empty builder with default runtime configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution.
    /// Must be called before the model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Uses `manager` instead of the default cache location when loading builtin models
    pub fn with_model_manager(mut self, manager: ModelManager) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Overrides the labels, in logit order
    pub fn with_labels(mut self, labels: Vec<impl Into<String>>) -> Self {
        self.explicit_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Loads a builtin model from the model cache.
    ///
    /// # Errors
    /// - `BuildError` if a model is already set or the cache is unusable
    /// - `BuildError` if the model has not been downloaded yet
    /// - `BuildError`/`ModelError` if the files fail to load
    pub fn with_model(mut self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths already set".to_string()));
        }

        let manager = match self.manager.take() {
            Some(manager) => manager,
            None => ModelManager::new_default()
                .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?,
        };

        let info = model.get_model_info();
        if !manager.is_model_downloaded(&info.name) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::download_model()",
                model
            )));
        }

        let model_path = manager.get_model_path(&info.name);
        let tokenizer_path = manager.get_tokenizer_path(&info.name);
        let config_path = manager.get_config_path(&info.name);

        self.load(&model_path, &tokenizer_path, Some(&config_path))?;
        self.fallback_labels = info.labels;
        self.max_sequence_length = Some(model.characteristics().max_sequence_length);
        self.name = Some(info.name);
        self.manager = Some(manager);
        Ok(self)
    }

    /// Loads a model from explicit paths.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the tokenizer file
    /// * `config_path` - Optional `config.json` providing `id2label`
    /// * `max_sequence_length` - Longest accepted input in tokens, 512 if not provided
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        tokenizer_path: &str,
        config_path: Option<&str>,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || tokenizer_path.is_empty() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths cannot be empty".to_string()));
        }
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths already set".to_string()));
        }
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path)));
        }
        if !Path::new(tokenizer_path).exists() {
            return Err(ClassifierError::BuildError(format!("Tokenizer file not found: {}", tokenizer_path)));
        }

        self.load(Path::new(model_path), Path::new(tokenizer_path), config_path.map(Path::new))?;
        self.max_sequence_length = max_sequence_length;
        self.name = Path::new(model_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string());
        Ok(self)
    }

    fn load(&mut self, model_path: &Path, tokenizer_path: &Path, config_path: Option<&Path>) -> Result<(), ClassifierError> {
        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| {
                error!("Failed to load tokenizer: {}", e);
                ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
            })?;
        // Over-long input is rejected rather than silently cut
        tokenizer.with_truncation(None)
            .map_err(|e| ClassifierError::BuildError(format!("Failed to configure tokenizer: {}", e)))?;
        tokenizer.with_padding(None);
        info!("Tokenizer loaded from {:?}", tokenizer_path);

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        if let Some(config_path) = config_path.filter(|path| path.exists()) {
            let json = std::fs::read_to_string(config_path)
                .map_err(|e| ClassifierError::BuildError(format!("Failed to read model config: {}", e)))?;
            self.config_labels = labels_from_config(&json)?;
        }

        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string_lossy().to_string());
        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        Ok(())
    }

    /// Picks labels: explicit override, then config.json, then the builtin table.
    /// With none of those, generic `LABEL_{i}` names sized to the model output.
    fn resolve_labels(&mut self, num_scores: usize) -> Vec<String> {
        if let Some(labels) = self.explicit_labels.take() {
            return labels;
        }
        if let Some(labels) = self.config_labels.take() {
            return labels;
        }
        if !self.fallback_labels.is_empty() {
            return std::mem::take(&mut self.fallback_labels);
        }
        (0..num_scores).map(|i| format!("LABEL_{}", i)).collect()
    }

    /// Builds and returns the final OnnxSentimentModel instance
    ///
    /// # Errors
    /// - `BuildError` if no model was loaded
    /// - `BuildError` if the model fails on a sample input
    /// - `BuildError` if the label count does not match the model output
    pub fn build(mut self) -> Result<OnnxSentimentModel, ClassifierError> {
        if self.model_path.is_none() || self.tokenizer_path.is_none() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths must be set".to_string()));
        }

        let sample = self.classify(SAMPLE_TEXT)
            .map_err(|e| ClassifierError::BuildError(format!("Model failed on sample input: {}", e)))?;
        let labels = self.resolve_labels(sample.len());
        if labels.len() != sample.len() {
            return Err(ClassifierError::BuildError(format!(
                "Model outputs {} scores but {} labels were provided",
                sample.len(),
                labels.len()
            )));
        }
        info!("Model labels: {:?}", labels);

        let tokenizer = Arc::new(self.tokenizer.take()
            .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?);
        let session = Arc::new(self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?);
        let model_path = self.model_path.take().unwrap_or_default();
        let tokenizer_path = self.tokenizer_path.take().unwrap_or_default();

        Ok(OnnxSentimentModel {
            name: self.name.take().unwrap_or_else(|| "onnx".to_string()),
            model_path,
            tokenizer_path,
            tokenizer,
            session,
            labels: Arc::new(labels),
            max_sequence_length: self.max_sequence_length.unwrap_or(DEFAULT_MAX_SEQUENCE_LENGTH),
        })
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        for required in ["input_ids", "attention_mask"] {
            if !session.inputs.iter().any(|input| input.name == required) {
                return Err(ClassifierError::ModelError(format!(
                    "Model must have an '{}' input, found {:?}",
                    required,
                    session.inputs.iter().map(|input| input.name.as_str()).collect::<Vec<_>>()
                )));
            }
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_from_config_orders_by_index() -> Result<(), ClassifierError> {
        let json = r#"{"id2label": {"2": "positive", "0": "negative", "1": "neutral"}, "model_type": "xlm-roberta"}"#;
        let labels = labels_from_config(json)?;
        assert_eq!(labels, Some(vec!["negative".to_string(), "neutral".to_string(), "positive".to_string()]));
        Ok(())
    }

    #[test]
    fn test_labels_from_config_without_table() -> Result<(), ClassifierError> {
        assert_eq!(labels_from_config(r#"{"model_type": "bert"}"#)?, None);
        assert_eq!(labels_from_config(r#"{"id2label": {}}"#)?, None);
        Ok(())
    }

    #[test]
    fn test_labels_from_config_rejects_gaps_and_bad_keys() {
        assert!(labels_from_config(r#"{"id2label": {"0": "neg", "2": "pos"}}"#).is_err());
        assert!(labels_from_config(r#"{"id2label": {"zero": "neg"}}"#).is_err());
        assert!(matches!(labels_from_config("not json"), Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_build_without_model_fails() {
        let result = OnnxSentimentModelBuilder::new()
            .with_labels(vec!["negative", "positive"])
            .build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_custom_model_validation() {
        assert!(OnnxSentimentModelBuilder::new()
            .with_custom_model("", "tokenizer.json", None, None)
            .is_err());
        assert!(OnnxSentimentModelBuilder::new()
            .with_custom_model("/nonexistent/model.onnx", "/nonexistent/tokenizer.json", None, Some(128))
            .is_err());
    }

    #[test]
    fn test_builtin_model_requires_download() {
        let dir = std::env::temp_dir().join(format!("chat-sentiment-empty-{}", std::process::id()));
        let manager = ModelManager::new(&dir).unwrap();
        let result = OnnxSentimentModelBuilder::new()
            .with_model_manager(manager)
            .with_model(BuiltinModel::XlmRobertaSentiment);
        assert!(matches!(result, Err(ClassifierError::BuildError(msg)) if msg.contains("not downloaded")));
    }
}
