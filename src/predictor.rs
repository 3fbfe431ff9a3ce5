//! End-to-end prediction: resolve the city from the address, assemble the
//! feature row, score the ensemble.

use std::path::Path;

use serde::Serialize;

use crate::artifacts::{ArtifactError, Artifacts};
use crate::city::{CityResolver, ResolvedCity};
use crate::features::PropertyInput;
use crate::model::GradientBoostingModel;
use crate::pipeline::{Pipeline, PipelineError};

/// Shown whenever an address resolves to no catalog city. Both the web
/// form and the CLI surface this text.
pub const UNRESOLVED_CITY_WARNING: &str =
    "Could not detect city from address. Please include a valid city name.";

/// A finished prediction with the city it was scored for.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub city: ResolvedCity,
    /// Estimated price in Lakhs.
    pub price_lakhs: f64,
}

/// Everything needed to turn form input into a price.
///
/// Built once at startup from the artifact set and shared read-only
/// afterwards; prediction never mutates.
pub struct Predictor {
    resolver: CityResolver,
    pipeline: Pipeline,
    model: GradientBoostingModel,
}

impl Predictor {
    /// Assemble a predictor from an already-loaded artifact set.
    pub fn from_artifacts(artifacts: Artifacts) -> Result<Self, ArtifactError> {
        let resolver = CityResolver::new(artifacts.city_catalog())?;
        let Artifacts {
            encoders,
            power,
            scaler,
            model,
        } = artifacts;
        Ok(Self {
            resolver,
            pipeline: Pipeline {
                encoders,
                power,
                scaler,
            },
            model,
        })
    }

    /// Load the artifact set under `dir` and assemble.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        Self::from_artifacts(Artifacts::load(dir)?)
    }

    /// Resolve the city only. Drives the live feedback under the address
    /// field.
    pub fn resolve_city(&self, address: &str) -> Option<ResolvedCity> {
        self.resolver.resolve(address)
    }

    /// The city catalog, in encoder order.
    pub fn cities(&self) -> Vec<&str> {
        self.resolver.catalog()
    }

    /// Encoder classes for a categorical column. Drives the form's choice
    /// widgets.
    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.pipeline
            .encoders
            .get(column)
            .map(|e| e.classes.as_slice())
    }

    /// Predict a price for `input`.
    ///
    /// `Ok(None)` means the address resolved to no catalog city; the
    /// caller shows a warning and withholds the price. A categorical
    /// value outside the fitted classes is an error proper.
    pub fn predict(&self, input: &PropertyInput) -> Result<Option<Prediction>, PipelineError> {
        let city = match self.resolver.resolve(&input.address) {
            Some(city) => city,
            None => return Ok(None),
        };
        let row = self.pipeline.feature_row(input, &city.name)?;
        let price_lakhs = self.model.predict(&row);
        Ok(Some(Prediction { city, price_lakhs }))
    }
}
