//! Feature contract shared by the pipeline, the artifacts and the model.
//!
//! The estimator was fitted on an 11-column frame; every stage here agrees
//! on those names and on their order, and the loaders refuse artifacts
//! that disagree.

use serde::{Deserialize, Serialize};

/// Model feature columns, in the exact order the estimator was fitted on.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "POSTED_BY",
    "UNDER_CONSTRUCTION",
    "RERA",
    "BHK_NO.",
    "BHK_OR_RK",
    "SQUARE_FT",
    "READY_TO_MOVE",
    "RESALE",
    "LONGITUDE",
    "LATITUDE",
    "CITY",
];

/// Columns the power transforms and the robust scaler apply to, in the
/// order the scaler was fitted on.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "UNDER_CONSTRUCTION",
    "RERA",
    "BHK_NO.",
    "SQUARE_FT",
    "READY_TO_MOVE",
    "RESALE",
    "LONGITUDE",
    "LATITUDE",
];

/// Label-encoded columns. CITY is encoded from the resolved city, never
/// taken from the form directly.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["POSTED_BY", "BHK_OR_RK", "CITY"];

/// One property as captured by the form, before any encoding.
///
/// Binary attributes stay `bool` all the way to the pipeline, which widens
/// them to 0.0/1.0 when it assembles the feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    /// Free-text address. The city is inferred from it, never entered
    /// directly.
    pub address: String,
    /// Listing party, one of the POSTED_BY encoder classes.
    pub posted_by: String,
    /// Layout kind, one of the BHK_OR_RK encoder classes.
    pub bhk_or_rk: String,
    /// Number of bedrooms (or rooms, for RK layouts).
    pub bhk: u32,
    pub square_ft: f64,
    #[serde(default)]
    pub under_construction: bool,
    #[serde(default)]
    pub rera: bool,
    #[serde(default)]
    pub ready_to_move: bool,
    #[serde(default)]
    pub resale: bool,
    pub longitude: f64,
    pub latitude: f64,
}

impl Default for PropertyInput {
    /// Mirrors the form's initial state: a 2 BHK of 1000 sq ft around the
    /// Delhi area, all flags off. The form defaults its choice widgets to
    /// the first encoder class, which is "Builder" for POSTED_BY.
    fn default() -> Self {
        Self {
            address: String::new(),
            posted_by: "Builder".to_string(),
            bhk_or_rk: "BHK".to_string(),
            bhk: 2,
            square_ft: 1000.0,
            under_construction: false,
            rera: false,
            ready_to_move: false,
            resale: false,
            longitude: 77.0,
            latitude: 28.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_is_the_last_feature() {
        assert_eq!(FEATURE_COLUMNS.last(), Some(&"CITY"));
    }

    #[test]
    fn test_numeric_columns_are_features() {
        for col in NUMERIC_COLUMNS {
            assert!(FEATURE_COLUMNS.contains(&col), "{col} missing");
        }
    }

    #[test]
    fn test_numeric_and_categorical_partition_the_features() {
        assert_eq!(
            NUMERIC_COLUMNS.len() + CATEGORICAL_COLUMNS.len(),
            FEATURE_COLUMNS.len()
        );
        for col in CATEGORICAL_COLUMNS {
            assert!(!NUMERIC_COLUMNS.contains(&col), "{col} in both sets");
        }
    }

    #[test]
    fn test_input_deserializes_with_flag_defaults() {
        let input: PropertyInput = serde_json::from_str(
            r#"{
                "address": "flat in pune",
                "posted_by": "Dealer",
                "bhk_or_rk": "BHK",
                "bhk": 3,
                "square_ft": 1450.0,
                "longitude": 73.85,
                "latitude": 18.52
            }"#,
        )
        .unwrap();
        assert!(!input.rera);
        assert!(!input.resale);
        assert_eq!(input.bhk, 3);
    }
}
