//! Keyword-counting sentiment model.
//!
//! Works offline with no model files: it counts how many words from a
//! positive and a negative list occur in the lowercased text and turns the
//! counts into a three-way score distribution.

use lazy_static::lazy_static;

use super::error::ClassifierError;
use super::{LabelScore, SentimentModel};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "awesome",
    "love", "like", "happy", "joy", "smile", "beautiful", "perfect", "best",
    "güzel", "harika", "mükemmel", "süper", "çok iyi", "seviyorum", "beğendim",
    "muhteşem", "müthiş", "iyi", "pozitif", "mutlu",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "angry", "sad", "disappointed",
    "horrible", "worst", "kötü", "berbat", "nefret", "sinir", "üzgün",
    "hayal kırıklığı", "korkunç", "en kötü", "çirkin", "negatif", "beğenmedim",
];

lazy_static! {
    static ref DEFAULT_LEXICON: Lexicon = Lexicon::new(POSITIVE_WORDS, NEGATIVE_WORDS);
}

#[derive(Debug, Clone)]
struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Lexicon {
    fn new(positive: &[impl AsRef<str>], negative: &[impl AsRef<str>]) -> Self {
        Self {
            positive: normalize_words(positive),
            negative: normalize_words(negative),
        }
    }

    /// Number of distinct list entries found in `text`, which must already be lowercase
    fn hits(words: &[String], text: &str) -> usize {
        words.iter().filter(|word| text.contains(word.as_str())).count()
    }
}

fn normalize_words(words: &[impl AsRef<str>]) -> Vec<String> {
    let mut out: Vec<String> = words.iter()
        .map(|word| word.as_ref().trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// A sentiment model that scores text by counting bilingual (English and Turkish) keywords.
///
/// # Example
/// ```
/// use chat_sentiment::{LexiconModel, SentimentModel};
///
/// let model = LexiconModel::new();
/// let scores = model.scores("I love this app! It's amazing!").unwrap();
/// let best = scores.iter().max_by(|a, b| a.score.total_cmp(&b.score)).unwrap();
/// assert_eq!(best.label, "positive");
/// ```
#[derive(Debug, Clone)]
pub struct LexiconModel {
    lexicon: Lexicon,
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconModel {
    /// Creates a model using the built-in word lists
    pub fn new() -> Self {
        Self {
            lexicon: DEFAULT_LEXICON.clone(),
        }
    }

    /// Creates a model with custom word lists. Entries are trimmed,
    /// lowercased and deduplicated; empty entries are dropped.
    pub fn with_words(positive: &[impl AsRef<str>], negative: &[impl AsRef<str>]) -> Self {
        Self {
            lexicon: Lexicon::new(positive, negative),
        }
    }

    /// Raw (positive, negative) keyword counts for `text`
    pub fn counts(&self, text: &str) -> (usize, usize) {
        let lower = text.to_lowercase();
        (
            Lexicon::hits(&self.lexicon.positive, &lower),
            Lexicon::hits(&self.lexicon.negative, &lower),
        )
    }
}

impl SentimentModel for LexiconModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn scores(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let (pos, neg) = self.counts(text);
        let total = pos + neg;

        let (winner, winning_score) = if pos > neg {
            ("positive", 0.5 + 0.5 * (pos - neg) as f32 / total as f32)
        } else if neg > pos {
            ("negative", 0.5 + 0.5 * (neg - pos) as f32 / total as f32)
        } else if total == 0 {
            ("neutral", 1.0)
        } else {
            ("neutral", 0.5)
        };
        let rest = (1.0 - winning_score) / 2.0;

        Ok(["positive", "negative", "neutral"]
            .iter()
            .map(|&label| {
                let score = if label == winner { winning_score } else { rest };
                LabelScore::new(label, score)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(scores: &[LabelScore]) -> (&str, f32) {
        let best = scores.iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();
        (best.label.as_str(), best.score)
    }

    #[test]
    fn test_english_and_turkish_keywords() -> Result<(), ClassifierError> {
        let model = LexiconModel::new();

        let scores = model.scores("Merhaba, bugün harika bir gün! Çok mutluyum.")?;
        assert_eq!(winner(&scores).0, "positive");

        let scores = model.scores("This is terrible, I hate it.")?;
        assert_eq!(winner(&scores), ("negative", 1.0));

        let scores = model.scores("The weather is okay today.")?;
        assert_eq!(winner(&scores), ("neutral", 1.0));
        Ok(())
    }

    #[test]
    fn test_turkish_examples_classify_offline() -> Result<(), ClassifierError> {
        let model = LexiconModel::new();
        assert_eq!(model.counts("Çok mutluyum"), (1, 0));
        assert_eq!(model.counts("Bu çok kötü bir deneyimdi. Hiç beğenmedim."), (0, 2));
        assert_eq!(winner(&model.scores("Hiç beğenmedim")?).0, "negative");
        Ok(())
    }

    #[test]
    fn test_tie_is_neutral() -> Result<(), ClassifierError> {
        let model = LexiconModel::with_words(&["good"], &["bad"]);
        assert_eq!(model.counts("good and bad"), (1, 1));
        let scores = model.scores("good and bad")?;
        assert_eq!(winner(&scores), ("neutral", 0.5));
        Ok(())
    }

    #[test]
    fn test_scores_form_distribution() -> Result<(), ClassifierError> {
        let model = LexiconModel::new();
        let scores = model.scores("great great, but one bad thing and one awful thing")?;
        let total: f32 = scores.iter().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
        Ok(())
    }

    #[test]
    fn test_custom_words_are_normalized() {
        let model = LexiconModel::with_words(&[" Brilliant ", "brilliant", ""], &["DREADFUL"]);
        assert_eq!(model.counts("What a BRILLIANT, dreadful day"), (1, 1));
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert!(LexiconModel::new().scores("   ").is_err());
    }
}
