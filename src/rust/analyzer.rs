use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierError, LabelScore, SentimentModel};

/// Coarse polarity bucket every model label is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of analysing one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    /// Winning score rounded to three decimals, always within [0, 1]
    pub confidence: f64,
    /// Label as reported by the model; absent on the fallback result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_label: Option<String>,
}

impl SentimentResult {
    /// The result reported for blank input and for any analysis failure
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
            original_label: None,
        }
    }
}

/// Maps a model label onto a sentiment bucket.
///
/// Matching is case-insensitive and substring based: anything containing
/// "pos" is positive, otherwise anything containing "neg" is negative,
/// everything else is neutral.
pub fn normalize_label(label: &str) -> Sentiment {
    let label = label.to_lowercase();
    // "positive" and "negative" contain "pos" and "neg"
    if label.contains("pos") {
        Sentiment::Positive
    } else if label.contains("neg") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn round3(value: f32) -> f64 {
    (f64::from(value) * 1000.0).round() / 1000.0
}

/// Reduces a model's scores to a result: highest score wins, the first one on ties.
///
/// Any non-finite score fails the whole selection.
pub fn select_best(scores: &[LabelScore]) -> Result<SentimentResult, ClassifierError> {
    if let Some(bad) = scores.iter().find(|s| !s.score.is_finite()) {
        return Err(ClassifierError::PredictionError(format!(
            "Non-finite score {} for label '{}'",
            bad.score, bad.label
        )));
    }

    let best = scores.iter()
        .reduce(|best, candidate| if candidate.score > best.score { candidate } else { best })
        .ok_or_else(|| ClassifierError::PredictionError("Model returned no scores".into()))?;

    Ok(SentimentResult {
        sentiment: normalize_label(&best.label),
        confidence: round3(best.score).clamp(0.0, 1.0),
        original_label: Some(best.label.clone()),
    })
}

/// Runs text through a sentiment model and normalizes the answer.
///
/// Analysis never fails: blank input and every model error produce
/// [`SentimentResult::neutral`].
#[derive(Clone)]
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
}

impl fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl SentimentAnalyzer {
    pub fn new(model: impl SentimentModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_arc(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Like [`analyze`](Self::analyze) but surfaces the model error instead of degrading.
    /// Blank input still yields the neutral result.
    pub fn try_analyze(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::neutral());
        }
        let scores = self.model.scores(text)?;
        select_best(&scores)
    }

    pub fn analyze(&self, text: &str) -> SentimentResult {
        match self.try_analyze(text) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Sentiment analysis failed, reporting neutral: {}", e);
                SentimentResult::neutral()
            }
        }
    }
}
