use tokenizers::Tokenizer;
use ort::session::Session;
use ndarray::Array2;
use ort::value::Tensor;
use std::collections::HashMap;

use super::error::ClassifierError;
use super::utils::softmax;

/// Runs a sequence-classification ONNX model over text.
///
/// The ONNX model is expected to:
/// - Accept `input_ids` and `attention_mask` (shape [batch_size, sequence_length]),
///   plus `token_type_ids` if the exported graph declares it
/// - Output logits of shape [batch_size, num_labels]
pub(crate) trait SequenceClassification {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the maximum sequence length the model can handle
    fn max_sequence_length(&self) -> Option<usize>;

    /// Counts the tokens the model would see for `text`, special tokens included.
    fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;

        tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))
            .map(|encoding| encoding.get_ids().len())
    }

    /// Encodes text into token ids and the matching attention mask.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized or encoding fails
    /// - `ValidationError` if the token length exceeds max_sequence_length
    fn tokenize(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>), ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self.max_sequence_length()
            .ok_or_else(|| ClassifierError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;
        let token_ids = encoding.get_ids();

        if token_ids.is_empty() {
            return Err(ClassifierError::TokenizerError("Tokenizer produced no tokens".into()));
        }
        if token_ids.len() > max_length {
            return Err(ClassifierError::ValidationError(format!(
                "Input text too long: {} tokens (max: {})",
                token_ids.len(), max_length
            )));
        }

        let ids = token_ids.iter().map(|&id| i64::from(id)).collect();
        let mask = encoding.get_attention_mask().iter().map(|&m| i64::from(m)).collect();
        Ok((ids, mask))
    }

    /// Tokenizes `text`, runs the model and returns class probabilities in logit order.
    fn classify(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let (ids, mask) = self.tokenize(text)?;
        let logits = self.get_logits(ids, mask)?;
        softmax(&logits)
    }

    /// Runs the ONNX model on one encoded sequence and returns its raw logits.
    ///
    /// # Errors
    /// - `ModelError` if the session is not initialized, tensor creation fails,
    ///   the model fails to run or the output is not shaped [1, num_labels]
    fn get_logits(&self, ids: Vec<i64>, mask: Vec<i64>) -> Result<Vec<f32>, ClassifierError> {
        let session = self.session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;
        let len = ids.len();

        let input_ids = Array2::from_shape_vec((1, len), ids)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input array: {}", e)))?;
        let attention_mask = Array2::from_shape_vec((1, len), mask)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create mask array: {}", e)))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert("input_ids", Tensor::from_array(input_ids)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);
        input_tensors.insert("attention_mask", Tensor::from_array(attention_mask)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create mask tensor: {}", e)))?);

        if session.inputs.iter().any(|input| input.name == "token_type_ids") {
            let token_types = Array2::<i64>::zeros((1, len));
            input_tensors.insert("token_type_ids", Tensor::from_array(token_types)
                .map_err(|e| ClassifierError::ModelError(format!("Failed to create token type tensor: {}", e)))?);
        }

        let outputs = session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        let shape = output_tensor.shape();
        if shape.len() != 2 || shape[0] != 1 {
            return Err(ClassifierError::ModelError(format!(
                "Expected logits of shape [1, num_labels], got {:?}",
                shape
            )));
        }

        Ok(output_tensor.iter().cloned().collect())
    }
}
