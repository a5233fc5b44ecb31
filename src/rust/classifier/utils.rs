use super::error::ClassifierError;

/// Numerically stable softmax. Returns an empty vector for empty input.
///
/// # Errors
/// - `PredictionError` if any logit is NaN or the normalizer is not a positive finite number
pub(crate) fn softmax(logits: &[f32]) -> Result<Vec<f32>, ClassifierError> {
    if logits.is_empty() {
        return Ok(Vec::new());
    }
    if logits.iter().any(|x| x.is_nan()) {
        return Err(ClassifierError::PredictionError(format!("NaN in logits {:?}", logits)));
    }

    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) || exps.iter().any(|e| !e.is_finite()) {
        return Err(ClassifierError::PredictionError(format!(
            "Cannot normalize logits {:?}",
            logits
        )));
    }
    Ok(exps.into_iter().map(|e| e / sum).collect())
}
