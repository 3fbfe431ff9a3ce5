//! Loading of the fitted artifacts the app scores with.
//!
//! Four JSON files live in the artifact directory: label encoders, the
//! per-column power transforms, the robust scaler and the boosted model.
//! Everything loads once at startup and is validated up front; a missing
//! file, a parse failure or a schema mismatch is fatal. There is no
//! degraded mode with a partial pipeline.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::features::{CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERIC_COLUMNS};
use crate::model::GradientBoostingModel;
use crate::pipeline::{LabelEncoders, PowerTransforms, RobustScaler};

/// File names expected inside the artifact directory.
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const POWER_FILE: &str = "yeo_transformers.json";
pub const SCALER_FILE: &str = "robust_scaler.json";
pub const MODEL_FILE: &str = "model.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {}: {detail}", path.display())]
    Invalid { path: PathBuf, detail: String },
    #[error("cannot compile city pattern: {0}")]
    CityPattern(#[from] regex::Error),
}

/// The full fitted-artifact set, loaded and validated.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub encoders: LabelEncoders,
    pub power: PowerTransforms,
    pub scaler: RobustScaler,
    pub model: GradientBoostingModel,
}

impl Artifacts {
    /// Load and validate every artifact under `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let encoders: LabelEncoders = read_json(&dir.join(ENCODERS_FILE))?;
        let power: PowerTransforms = read_json(&dir.join(POWER_FILE))?;
        let scaler: RobustScaler = read_json(&dir.join(SCALER_FILE))?;
        let model: GradientBoostingModel = read_json(&dir.join(MODEL_FILE))?;

        let artifacts = Self {
            encoders,
            power,
            scaler,
            model,
        };
        artifacts.validate(dir)?;

        info!(
            "loaded artifacts from {}: {} cities, {} power transforms, {} trees",
            dir.display(),
            artifacts.city_catalog().len(),
            artifacts.power.by_column.len(),
            artifacts.model.trees.len(),
        );
        Ok(artifacts)
    }

    /// The CITY encoder's classes. They double as the resolver catalog,
    /// so resolved cities always encode cleanly.
    pub fn city_catalog(&self) -> &[String] {
        self.encoders
            .get("CITY")
            .map(|e| e.classes.as_slice())
            .unwrap_or(&[])
    }

    fn validate(&self, dir: &Path) -> Result<(), ArtifactError> {
        self.validate_encoders(&dir.join(ENCODERS_FILE))?;
        self.validate_power(&dir.join(POWER_FILE))?;
        self.validate_scaler(&dir.join(SCALER_FILE))?;
        self.model
            .validate(&FEATURE_COLUMNS)
            .map_err(|detail| invalid(dir.join(MODEL_FILE), detail))?;
        Ok(())
    }

    fn validate_encoders(&self, path: &Path) -> Result<(), ArtifactError> {
        for column in CATEGORICAL_COLUMNS {
            let encoder = self
                .encoders
                .get(column)
                .ok_or_else(|| invalid(path.to_path_buf(), format!("no encoder for column {column:?}")))?;
            if encoder.classes.is_empty() {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("encoder for {column:?} has no classes"),
                ));
            }
            let mut seen = BTreeSet::new();
            for class in &encoder.classes {
                if class.trim().is_empty() {
                    return Err(invalid(
                        path.to_path_buf(),
                        format!("encoder for {column:?} contains a blank class"),
                    ));
                }
                if !seen.insert(class.as_str()) {
                    return Err(invalid(
                        path.to_path_buf(),
                        format!("encoder for {column:?} lists {class:?} twice"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_power(&self, path: &Path) -> Result<(), ArtifactError> {
        for (column, transform) in &self.power.by_column {
            if !NUMERIC_COLUMNS.contains(&column.as_str()) {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("transform for {column:?}, which is not a numeric column"),
                ));
            }
            if !transform.lambda.is_finite() || !transform.mean.is_finite() {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("transform for {column:?} has non-finite parameters"),
                ));
            }
            if !transform.scale.is_finite() || transform.scale == 0.0 {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("transform for {column:?} has unusable scale {}", transform.scale),
                ));
            }
        }
        Ok(())
    }

    fn validate_scaler(&self, path: &Path) -> Result<(), ArtifactError> {
        let scaler = &self.scaler;
        if scaler.columns.len() != NUMERIC_COLUMNS.len()
            || !scaler
                .columns
                .iter()
                .zip(NUMERIC_COLUMNS)
                .all(|(got, want)| got == want)
        {
            return Err(invalid(
                path.to_path_buf(),
                format!(
                    "scaler was fitted on columns {:?}, expected {:?}",
                    scaler.columns, NUMERIC_COLUMNS
                ),
            ));
        }
        if scaler.center.len() != scaler.columns.len()
            || scaler.scale.len() != scaler.columns.len()
        {
            return Err(invalid(
                path.to_path_buf(),
                "center and scale must have one entry per column".to_string(),
            ));
        }
        for (i, column) in scaler.columns.iter().enumerate() {
            if !scaler.center[i].is_finite() {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("non-finite center for {column:?}"),
                ));
            }
            if !scaler.scale[i].is_finite() || scaler.scale[i] == 0.0 {
                return Err(invalid(
                    path.to_path_buf(),
                    format!("unusable scale {} for {column:?}", scaler.scale[i]),
                ));
            }
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: PathBuf, detail: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        path,
        detail: detail.into(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A small but complete artifact set shared by the loader and
    //! predictor tests.

    use std::fs;
    use std::path::Path;

    pub(crate) const ENCODERS_JSON: &str = r#"{
        "POSTED_BY": {"classes": ["Builder", "Dealer", "Owner"]},
        "BHK_OR_RK": {"classes": ["BHK", "RK"]},
        "CITY": {"classes": ["Bangalore", "Chennai", "Delhi", "Mumbai", "Pune"]}
    }"#;

    pub(crate) const POWER_JSON: &str = r#"{
        "SQUARE_FT": {"lambda": 0.0, "mean": 6.0, "scale": 2.0},
        "BHK_NO.": {"lambda": 1.0, "mean": 0.0, "scale": 1.0}
    }"#;

    pub(crate) const SCALER_JSON: &str = r#"{
        "columns": ["UNDER_CONSTRUCTION", "RERA", "BHK_NO.", "SQUARE_FT",
                    "READY_TO_MOVE", "RESALE", "LONGITUDE", "LATITUDE"],
        "center": [0.0, 0.0, 2.0, 0.5, 0.0, 0.0, 77.0, 20.0],
        "scale": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 5.0, 8.0]
    }"#;

    pub(crate) const MODEL_JSON: &str = r#"{
        "feature_names": ["POSTED_BY", "UNDER_CONSTRUCTION", "RERA", "BHK_NO.",
                          "BHK_OR_RK", "SQUARE_FT", "READY_TO_MOVE", "RESALE",
                          "LONGITUDE", "LATITUDE", "CITY"],
        "base_score": 50.0,
        "learning_rate": 0.5,
        "trees": [
            {"nodes": [
                {"feature": 5, "threshold": 0.0, "left": 1, "right": 2},
                {"value": -20.0},
                {"value": 20.0}
            ]},
            {"nodes": [
                {"feature": 10, "threshold": 1.5, "left": 1, "right": 2},
                {"value": 10.0},
                {"value": -5.0}
            ]}
        ]
    }"#;

    /// Write the full artifact set into `dir`.
    pub(crate) fn write_sample_artifacts(dir: &Path) {
        fs::write(dir.join(super::ENCODERS_FILE), ENCODERS_JSON).unwrap();
        fs::write(dir.join(super::POWER_FILE), POWER_JSON).unwrap();
        fs::write(dir.join(super::SCALER_FILE), SCALER_JSON).unwrap();
        fs::write(dir.join(super::MODEL_FILE), MODEL_JSON).unwrap();
    }
}
