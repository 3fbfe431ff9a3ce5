//! Preprocessing pipeline: form input to model feature row.
//!
//! Mirrors the fitting order exactly: label-encode the categoricals,
//! Yeo-Johnson each numeric column that has a fitted transform, then
//! robust-scale the whole numeric block. The output is the 11-value row
//! the estimator was trained on, in [`FEATURE_COLUMNS`] order.

pub mod encoders;
pub mod power;
pub mod scaler;

use thiserror::Error;

pub use encoders::{LabelEncoder, LabelEncoders};
pub use power::{PowerTransform, PowerTransforms};
pub use scaler::RobustScaler;

use crate::features::{PropertyInput, FEATURE_COLUMNS, NUMERIC_COLUMNS};

/// Input-dependent failures while assembling a feature row.
///
/// These map to bad requests, unlike artifact problems which are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no label encoder fitted for column {0:?}")]
    MissingEncoder(String),
    #[error("unrecognized {column} value {value:?}; not among the fitted classes")]
    UnknownCategory { column: String, value: String },
}

/// The fitted preprocessing stages, applied in training order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub encoders: LabelEncoders,
    pub power: PowerTransforms,
    pub scaler: RobustScaler,
}

impl Pipeline {
    /// Assemble the model row for `input`, with `city` already resolved
    /// against the catalog.
    ///
    /// Binary flags widen to 0.0/1.0 here; they ride through the power
    /// and scaling stages like any other numeric column.
    pub fn feature_row(
        &self,
        input: &PropertyInput,
        city: &str,
    ) -> Result<[f64; FEATURE_COLUMNS.len()], PipelineError> {
        let posted_by = self.encoders.encode("POSTED_BY", &input.posted_by)?;
        let bhk_or_rk = self.encoders.encode("BHK_OR_RK", &input.bhk_or_rk)?;
        let city = self.encoders.encode("CITY", city)?;

        // Numeric block in scaler column order.
        let mut numeric = [
            flag(input.under_construction),
            flag(input.rera),
            f64::from(input.bhk),
            input.square_ft,
            flag(input.ready_to_move),
            flag(input.resale),
            input.longitude,
            input.latitude,
        ];
        for (i, column) in NUMERIC_COLUMNS.iter().enumerate() {
            numeric[i] = self.power.apply(column, numeric[i]);
        }
        self.scaler.apply(&mut numeric);

        Ok([
            posted_by,
            numeric[0], // UNDER_CONSTRUCTION
            numeric[1], // RERA
            numeric[2], // BHK_NO.
            bhk_or_rk,
            numeric[3], // SQUARE_FT
            numeric[4], // READY_TO_MOVE
            numeric[5], // RESALE
            numeric[6], // LONGITUDE
            numeric[7], // LATITUDE
            city,
        ])
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
