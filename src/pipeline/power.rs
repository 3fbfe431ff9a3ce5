//! Per-column Yeo-Johnson power transforms.
//!
//! Each transform carries the lambda found during fitting plus the mean
//! and scale used to standardize the transformed values. Columns without
//! a fitted transform pass through untouched.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Parameters of one fitted Yeo-Johnson transform.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerTransform {
    pub lambda: f64,
    /// Mean of the transformed training column; 0 when standardization
    /// was disabled at fit time.
    #[serde(default)]
    pub mean: f64,
    /// Standard deviation of the transformed training column; 1 when
    /// standardization was disabled at fit time.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl PowerTransform {
    /// Raw Yeo-Johnson response for `x` under this transform's lambda.
    ///
    /// The mapping is defined piecewise over the sign of `x`, with log
    /// limits at lambda 0 (non-negative side) and lambda 2 (negative
    /// side). Lambda 1 is the identity on both sides.
    pub fn yeo_johnson(&self, x: f64) -> f64 {
        let l = self.lambda;
        if x >= 0.0 {
            if l.abs() < f64::EPSILON {
                (x + 1.0).ln()
            } else {
                ((x + 1.0).powf(l) - 1.0) / l
            }
        } else if (l - 2.0).abs() < f64::EPSILON {
            -(1.0 - x).ln()
        } else {
            -((1.0 - x).powf(2.0 - l) - 1.0) / (2.0 - l)
        }
    }

    /// Transform then standardize: `(yj(x) - mean) / scale`.
    pub fn apply(&self, x: f64) -> f64 {
        (self.yeo_johnson(x) - self.mean) / self.scale
    }
}

/// Fitted transforms keyed by column name.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PowerTransforms {
    pub by_column: BTreeMap<String, PowerTransform>,
}

impl PowerTransforms {
    pub fn get(&self, column: &str) -> Option<&PowerTransform> {
        self.by_column.get(column)
    }

    /// Apply the transform fitted for `column`, or pass `x` through when
    /// none was fitted.
    pub fn apply(&self, column: &str, x: f64) -> f64 {
        match self.by_column.get(column) {
            Some(t) => t.apply(x),
            None => x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plain(lambda: f64) -> PowerTransform {
        PowerTransform {
            lambda,
            mean: 0.0,
            scale: 1.0,
        }
    }

    #[test]
    fn test_lambda_one_is_identity() {
        let t = plain(1.0);
        for x in [-12.5, -1.0, 0.0, 0.25, 1000.0] {
            assert_relative_eq!(t.yeo_johnson(x), x, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_lambda_zero_is_log1p_for_non_negative() {
        let t = plain(0.0);
        assert_relative_eq!(t.yeo_johnson(0.0), 0.0);
        assert_relative_eq!(
            t.yeo_johnson(std::f64::consts::E - 1.0),
            1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_lambda_two_is_log_branch_for_negative() {
        let t = plain(2.0);
        assert_relative_eq!(
            t.yeo_johnson(-(std::f64::consts::E - 1.0)),
            -1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_power_branches() {
        // Non-negative side: ((x+1)^l - 1) / l.
        assert_relative_eq!(plain(0.5).yeo_johnson(3.0), 2.0, max_relative = 1e-12);
        // Negative side: -((1-x)^(2-l) - 1) / (2-l).
        assert_relative_eq!(
            plain(0.5).yeo_johnson(-3.0),
            -14.0 / 3.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_monotone_in_x() {
        let t = plain(0.3);
        let mut prev = t.yeo_johnson(-50.0);
        for i in -49..50 {
            let next = t.yeo_johnson(f64::from(i));
            assert!(next > prev, "not increasing at x={i}");
            prev = next;
        }
    }

    #[test]
    fn test_apply_standardizes() {
        let t = PowerTransform {
            lambda: 1.0,
            mean: 4.0,
            scale: 2.0,
        };
        assert_relative_eq!(t.apply(10.0), 3.0);
    }

    #[test]
    fn test_missing_column_passes_through() {
        let set = PowerTransforms {
            by_column: BTreeMap::new(),
        };
        assert_relative_eq!(set.apply("SQUARE_FT", 1234.5), 1234.5);
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let set: PowerTransforms =
            serde_json::from_str(r#"{"SQUARE_FT": {"lambda": 0.12}}"#).unwrap();
        let t = set.get("SQUARE_FT").unwrap();
        assert_relative_eq!(t.mean, 0.0);
        assert_relative_eq!(t.scale, 1.0);
    }
}
