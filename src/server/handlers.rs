use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::city::ResolvedCity;
use crate::features::PropertyInput;
use crate::pipeline::PipelineError;
use crate::predictor::{Predictor, UNRESOLVED_CITY_WARNING};

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css")],
        static_files::STYLE_CSS,
    )
        .into_response()
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/choices ────────────────────────────────────────────

#[derive(Serialize)]
pub struct ChoicesResponse {
    pub posted_by: Vec<String>,
    pub bhk_or_rk: Vec<String>,
    pub cities: Vec<String>,
}

/// Encoder classes the form builds its choice widgets from.
pub async fn choices(State(state): State<Arc<AppState>>) -> Json<ChoicesResponse> {
    let predictor = &state.predictor;
    Json(ChoicesResponse {
        posted_by: classes_of(predictor, "POSTED_BY"),
        bhk_or_rk: classes_of(predictor, "BHK_OR_RK"),
        cities: predictor.cities().iter().map(|c| c.to_string()).collect(),
    })
}

fn classes_of(predictor: &Predictor, column: &str) -> Vec<String> {
    predictor
        .classes(column)
        .map(|c| c.to_vec())
        .unwrap_or_default()
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<ResolvedCity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Live city feedback while the user types. An address that matches
/// nothing is a normal 200 with a warning; the form keeps polling as the
/// text changes, so it is never an error.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    let start = Instant::now();
    let address = params.address.as_deref().unwrap_or("");

    let response = match state.predictor.resolve_city(address) {
        Some(city) => ResolveResponse {
            resolved: true,
            city: Some(city),
            warning: None,
        },
        None => ResolveResponse {
            resolved: false,
            city: None,
            warning: Some(UNRESOLVED_CITY_WARNING.to_string()),
        },
    };

    info!(
        "GET /api/resolve address={:?} -> {} ({:.1}ms)",
        address,
        response
            .city
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("unresolved"),
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Json(response)
}

// ─── GET /api/predict ────────────────────────────────────────────

#[derive(Serialize)]
pub struct PredictResponse {
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<ResolvedCity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_lakhs: Option<f64>,
    /// Price formatted the way the form shows it, e.g. "43.75 Lakhs".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(input): Query<PropertyInput>,
) -> Result<Json<PredictResponse>, Response> {
    let start = Instant::now();

    validate_ranges(&input).map_err(|e| e.into_response())?;

    let prediction = state.predictor.predict(&input).map_err(|e| {
        let status = match e {
            PipelineError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
            PipelineError::MissingEncoder(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.to_string()).into_response()
    })?;

    let elapsed = start.elapsed();
    let response = match prediction {
        Some(p) => {
            info!(
                "GET /api/predict address={:?} -> {:.2} lakhs in {} ({:.1}ms)",
                input.address,
                p.price_lakhs,
                p.city.name,
                elapsed.as_secs_f64() * 1000.0,
            );
            PredictResponse {
                resolved: true,
                display: Some(format!("{:.2} Lakhs", p.price_lakhs)),
                price_lakhs: Some(p.price_lakhs),
                city: Some(p.city),
                warning: None,
            }
        }
        None => {
            info!(
                "GET /api/predict address={:?} -> unresolved ({:.1}ms)",
                input.address,
                elapsed.as_secs_f64() * 1000.0,
            );
            PredictResponse {
                resolved: false,
                city: None,
                price_lakhs: None,
                display: None,
                warning: Some(UNRESOLVED_CITY_WARNING.to_string()),
            }
        }
    };

    Ok(Json(response))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Re-check the form's widget bounds on the server side. NaN fails every
/// range test, so non-finite numbers are rejected here too.
fn validate_ranges(input: &PropertyInput) -> Result<(), ApiError> {
    if !(1..=20).contains(&input.bhk) {
        return Err(api_error(StatusCode::BAD_REQUEST, "BHK must be 1-20"));
    }
    if !(100.0..=10_000.0).contains(&input.square_ft) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Square footage must be 100-10000",
        ));
    }
    if !(-90.0..=90.0).contains(&input.latitude) || !(-180.0..=180.0).contains(&input.longitude) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lon: -180..180",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PropertyInput {
        PropertyInput {
            address: "flat in pune".to_string(),
            ..PropertyInput::default()
        }
    }

    #[test]
    fn test_default_input_passes_range_checks() {
        assert!(validate_ranges(&input()).is_ok());
    }

    #[test]
    fn test_out_of_range_bhk_is_rejected() {
        let mut bad = input();
        bad.bhk = 0;
        assert!(validate_ranges(&bad).is_err());
        bad.bhk = 21;
        assert!(validate_ranges(&bad).is_err());
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let mut bad = input();
        bad.latitude = 95.0;
        assert!(validate_ranges(&bad).is_err());

        let mut bad = input();
        bad.longitude = -181.0;
        assert!(validate_ranges(&bad).is_err());
    }

    #[test]
    fn test_non_finite_square_footage_is_rejected() {
        let mut bad = input();
        bad.square_ft = f64::NAN;
        assert!(validate_ranges(&bad).is_err());
        bad.square_ft = f64::INFINITY;
        assert!(validate_ranges(&bad).is_err());
    }

    #[test]
    fn test_unresolved_response_omits_price_fields() {
        let response = PredictResponse {
            resolved: false,
            city: None,
            price_lakhs: None,
            display: None,
            warning: Some(UNRESOLVED_CITY_WARNING.to_string()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["resolved"], false);
        assert!(value.get("price_lakhs").is_none());
        assert!(value.get("city").is_none());
        assert!(value["warning"].as_str().unwrap().contains("city"));
    }
}
