//! Fitted label encoders for the categorical columns.
//!
//! Each encoder is just its class list in fit order; encoding a value is
//! its index in that list, exactly as the estimator saw it during
//! training. Values outside the fitted classes are an input error, not a
//! silent extra class.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::PipelineError;

/// One fitted label encoder.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    /// Fitted classes, index = encoded value.
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Encoded value for `value`, or `None` if it was never fitted.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }
}

/// The full encoder set, keyed by column name.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders {
    pub by_column: BTreeMap<String, LabelEncoder>,
}

impl LabelEncoders {
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.by_column.get(column)
    }

    /// Encode `value` for `column` as a model feature.
    pub fn encode(&self, column: &str, value: &str) -> Result<f64, PipelineError> {
        let encoder = self
            .by_column
            .get(column)
            .ok_or_else(|| PipelineError::MissingEncoder(column.to_string()))?;
        encoder
            .encode(value)
            .map(|idx| idx as f64)
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            })
    }
}
