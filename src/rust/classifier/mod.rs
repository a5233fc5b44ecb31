use serde::Serialize;

mod error;
mod inference;
mod model;
pub mod builder;
pub mod lexicon;
mod utils;

pub use error::ClassifierError;
pub use model::OnnxSentimentModel;
pub use builder::OnnxSentimentModelBuilder;
pub use lexicon::LexiconModel;

/// One entry of a classifier's output: a raw label and its probability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// The external sentiment classifier as seen by the analyzer.
///
/// Implementations return a score for every label they know about, in the
/// model's own vocabulary (`"positive"`, `"LABEL_2"`, `"pos"`...). Mapping
/// those labels onto the three sentiment buckets is the analyzer's job.
pub trait SentimentModel: Send + Sync {
    /// Human readable name, reported by the health endpoint
    fn name(&self) -> &str;

    /// Scores every label for `text`
    fn scores(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Information about a loaded ONNX sentiment model
#[derive(Debug, Clone)]
pub struct ModelSummary {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the tokenizer file
    pub tokenizer_path: String,
    /// Labels in logit order
    pub labels: Vec<String>,
    /// Longest accepted input, in tokens
    pub max_sequence_length: usize,
}
