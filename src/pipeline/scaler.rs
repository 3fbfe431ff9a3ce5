//! Fitted robust scaler over the numeric feature block.

use serde::Deserialize;

/// Robust scaler statistics: per-column center (median) and scale
/// (interquartile range), in the column order the scaler was fitted on.
#[derive(Debug, Clone, Deserialize)]
pub struct RobustScaler {
    pub columns: Vec<String>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

impl RobustScaler {
    /// Scale `values` in place. The slice must follow [`Self::columns`]
    /// order; the loader guarantees the three vectors agree in length.
    pub fn apply(&self, values: &mut [f64]) {
        debug_assert_eq!(values.len(), self.center.len());
        for (i, v) in values.iter_mut().enumerate() {
            *v = (*v - self.center[i]) / self.scale[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scaler() -> RobustScaler {
        RobustScaler {
            columns: vec!["SQUARE_FT".to_string(), "LATITUDE".to_string()],
            center: vec![1000.0, 20.0],
            scale: vec![500.0, 8.0],
        }
    }

    #[test]
    fn test_centers_and_scales_each_column() {
        let mut values = [1500.0, 28.0];
        scaler().apply(&mut values);
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[1], 1.0);
    }

    #[test]
    fn test_center_maps_to_zero() {
        let mut values = [1000.0, 20.0];
        scaler().apply(&mut values);
        assert_relative_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], 0.0);
    }

    #[test]
    fn test_deserializes_from_artifact_shape() {
        let s: RobustScaler = serde_json::from_str(
            r#"{
                "columns": ["RERA"],
                "center": [0.0],
                "scale": [1.0]
            }"#,
        )
        .unwrap();
        let mut values = [1.0];
        s.apply(&mut values);
        assert_relative_eq!(values[0], 1.0);
    }
}
