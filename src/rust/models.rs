/// Represents the available built-in models in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// Multilingual XLM-RoBERTa model fine-tuned on tweets for three-way sentiment
    ///
    /// Characteristics:
    /// - Labels: negative, neutral, positive
    /// - Max sequence length: 512
    /// - Size: ~280MB (int8 quantized ONNX export)
    /// - Covers Turkish and English among ~30 languages
    XlmRobertaSentiment,
}

/// Characteristics of a model including its capabilities and requirements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCharacteristics {
    /// Maximum sequence length the model can handle, special tokens included
    pub max_sequence_length: usize,
    /// Width of the logits row produced by the model
    pub num_labels: usize,
    /// Approximate size of the model in memory
    pub model_size_mb: usize,
}

/// Where a model's files live and how to check them
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub config_url: String,
    /// SHA-256 of model.onnx; files without a pinned hash are only checked for presence
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
    /// Index to label table used when config.json carries no id2label
    pub labels: Vec<String>,
}

impl BuiltinModel {
    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::XlmRobertaSentiment => ModelCharacteristics {
                max_sequence_length: 512,
                num_labels: 3,
                model_size_mb: 280,
            },
        }
    }

    /// Get the download information for the model
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::XlmRobertaSentiment => {
                let base = "https://huggingface.co/Xenova/twitter-xlm-roberta-base-sentiment/resolve/main";
                ModelInfo {
                    name: "twitter-xlm-roberta-base-sentiment".to_string(),
                    model_url: format!("{}/onnx/model_quantized.onnx", base),
                    tokenizer_url: format!("{}/tokenizer.json", base),
                    config_url: format!("{}/config.json", base),
                    model_hash: None,
                    tokenizer_hash: None,
                    labels: vec![
                        "negative".to_string(),
                        "neutral".to_string(),
                        "positive".to_string(),
                    ],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels_match_characteristics() {
        let model = BuiltinModel::XlmRobertaSentiment;
        let info = model.get_model_info();
        assert_eq!(info.labels.len(), model.characteristics().num_labels);
        assert!(info.model_url.ends_with(".onnx"));
        assert!(info.tokenizer_url.ends_with("tokenizer.json"));
        assert!(info.config_url.ends_with("config.json"));
    }
}
