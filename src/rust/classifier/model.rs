use std::sync::Arc;
use ort::session::Session;
use tokenizers::Tokenizer;

use super::error::ClassifierError;
use super::inference::SequenceClassification;
use super::{LabelScore, ModelSummary, SentimentModel};

/// A thread-safe sentiment model backed by an ONNX sequence classifier.
///
/// # Thread Safety
///
/// The tokenizer and session are held in `Arc`s and only read after
/// construction, so one instance can serve every request:
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use chat_sentiment::{BuiltinModel, OnnxSentimentModel, SentimentModel};
/// use std::sync::Arc;
/// use std::thread;
///
/// let model = Arc::new(OnnxSentimentModel::builder()
///     .with_model(BuiltinModel::XlmRobertaSentiment)?
///     .build()?);
///
/// let model_clone = Arc::clone(&model);
/// thread::spawn(move || {
///     model_clone.scores("Bugün harika bir gün!").unwrap();
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OnnxSentimentModel {
    pub(crate) name: String,
    pub(crate) model_path: String,
    pub(crate) tokenizer_path: String,
    pub(crate) tokenizer: Arc<Tokenizer>,
    pub(crate) session: Arc<Session>,
    pub(crate) labels: Arc<Vec<String>>,
    pub(crate) max_sequence_length: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxSentimentModel>();
    }
};

impl SequenceClassification for OnnxSentimentModel {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.max_sequence_length)
    }
}

impl OnnxSentimentModel {
    /// Creates a new OnnxSentimentModelBuilder for fluent construction
    pub fn builder() -> super::builder::OnnxSentimentModelBuilder {
        super::builder::OnnxSentimentModelBuilder::new()
    }

    /// Returns information about the loaded model
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            labels: self.labels.as_ref().clone(),
            max_sequence_length: self.max_sequence_length,
        }
    }

    /// Number of tokens `text` encodes to, special tokens included
    pub fn token_count(&self, text: &str) -> Result<usize, ClassifierError> {
        self.count_tokens(text)
    }
}

impl SentimentModel for OnnxSentimentModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn scores(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let probabilities = self.classify(text)?;
        if probabilities.len() != self.labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores but {} labels are configured",
                probabilities.len(),
                self.labels.len()
            )));
        }

        Ok(self.labels.iter()
            .zip(probabilities)
            .map(|(label, score)| LabelScore::new(label.clone(), score))
            .collect())
    }
}
