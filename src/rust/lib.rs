//! Multilingual chat sentiment analysis behind a small web UI and JSON API.
//!
//! Text is scored by a [`SentimentModel`] (an ONNX transformer, or the
//! offline keyword lexicon) and the winning label is normalized into
//! positive, negative or neutral by the [`SentimentAnalyzer`].
//!
//! # Basic Usage
//!
//! ```rust
//! use chat_sentiment::{LexiconModel, Sentiment, SentimentAnalyzer};
//!
//! let analyzer = SentimentAnalyzer::new(LexiconModel::new());
//! let result = analyzer.analyze("I love this app! It's amazing!");
//! assert_eq!(result.sentiment, Sentiment::Positive);
//!
//! // Blank input never reaches the model
//! assert_eq!(analyzer.analyze("   ").confidence, 0.0);
//! ```
//!
//! # Using the ONNX model
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use chat_sentiment::{BuiltinModel, ModelManager, OnnxSentimentModel, SentimentAnalyzer};
//!
//! let manager = ModelManager::new_default()?;
//! manager.ensure_model_downloaded(&BuiltinModel::XlmRobertaSentiment.get_model_info()).await?;
//!
//! let model = OnnxSentimentModel::builder()
//!     .with_model(BuiltinModel::XlmRobertaSentiment)?
//!     .build()?;
//! let analyzer = SentimentAnalyzer::new(model);
//! println!("{:?}", analyzer.analyze("Bugün hava normal, ne iyi ne kötü."));
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod classifier;
pub mod config;
mod runtime;
pub mod model_manager;
pub mod models;
pub mod server;

pub use analyzer::{normalize_label, Sentiment, SentimentAnalyzer, SentimentResult};
pub use classifier::{
    ClassifierError, LabelScore, LexiconModel, ModelSummary, OnnxSentimentModel,
    OnnxSentimentModelBuilder, SentimentModel,
};
pub use config::{ConfigError, ServerConfig};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};

pub fn init_logger() {
    env_logger::init();
}
