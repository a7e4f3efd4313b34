//! Model metadata: the training-time contract a prediction must satisfy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Metadata persisted alongside the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature column names in training order. Prediction extracts values
    /// by these names, in this order.
    pub feature_names: Vec<String>,
    /// Column the labels came from.
    pub target_name: String,
    /// Rows that survived normalization and went into training.
    pub samples_used: usize,
    /// Rows discarded by normalization.
    pub rows_skipped: usize,
}

impl ModelMeta {
    /// Build the ordered feature vector for one prediction record.
    ///
    /// Every feature name must be present and numeric (a JSON number, or a
    /// string that parses to a finite number). Anything else rejects the
    /// whole record with [`ModelError::InvalidInput`].
    pub fn extract_vector(
        &self,
        record: &serde_json::Map<String, Value>,
    ) -> Result<Vec<f64>, ModelError> {
        let mut vector = Vec::with_capacity(self.feature_names.len());
        for name in &self.feature_names {
            match record.get(name).and_then(numeric_value) {
                Some(value) => vector.push(value),
                None => {
                    return Err(ModelError::InvalidInput(format!(
                        "missing or invalid numeric inputs; required: {}",
                        self.feature_names.join(", ")
                    )))
                }
            }
        }
        Ok(vector)
    }
}

/// Interpret a JSON value as a finite number. Numbers pass through, strings
/// are trimmed and parsed; booleans, nulls, containers, and non-finite
/// values are all rejected.
fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}
