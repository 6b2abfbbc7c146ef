use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use std::collections::HashMap;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::error::ApiError;
use crate::models::{parse_lax_int, BoutFeatures, HealthStatus};
use crate::scorer;

/// Build the Axum router for the prediction service.
pub fn router(body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthStatus::ok())
}

/// POST /predict
async fn predict_handler(BoutRequest(features): BoutRequest) -> impl IntoResponse {
    let result = scorer::predict(features);
    debug!(
        "Predicted {} vs {}: {:.3} / {:.3}",
        result.fighter_a, result.fighter_b, result.prob_a, result.prob_b
    );
    Json(result)
}

// ── Request decoding ─────────────────────────────────────────────────────────

/// A bout decoded from either a JSON or a url-encoded form body.
pub struct BoutRequest(pub BoutFeatures);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Unsupported,
}

/// A missing `Content-Type` is read as JSON.
fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return BodyKind::Json;
    };
    let Ok(value) = value.to_str() else {
        return BodyKind::Unsupported;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if essence == "application/json" || essence.ends_with("+json") {
        BodyKind::Json
    } else {
        BodyKind::Unsupported
    }
}

#[async_trait]
impl<S> FromRequest<S> for BoutRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(req.headers()) {
            BodyKind::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
                Ok(Self(features_from_form(pairs)?))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state).await?;
                Ok(Self(features_from_json(&bytes)?))
            }
            BodyKind::Unsupported => Err(ApiError::UnsupportedMediaType),
        }
    }
}

/// Decode a JSON object. A repeated key keeps its last value.
fn features_from_json(bytes: &[u8]) -> Result<BoutFeatures, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::NotAnObject);
    }
    Ok(serde_path_to_error::deserialize::<_, BoutFeatures>(value)?)
}

/// Build a bout from form pairs. A repeated key keeps its last value and an
/// empty numeric field means "unknown".
fn features_from_form(pairs: Vec<(String, String)>) -> Result<BoutFeatures, ApiError> {
    let fields: HashMap<String, String> = pairs.into_iter().collect();
    let required = |name: &str| {
        fields
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::MissingField {
                field: name.to_string(),
            })
    };
    let optional = |name: &str| optional_int(name, fields.get(name).map(String::as_str));

    Ok(BoutFeatures {
        fighter_a: required("fighter_a")?,
        fighter_b: required("fighter_b")?,
        age_a: optional("age_a")?,
        age_b: optional("age_b")?,
        reach_a: optional("reach_a")?,
        reach_b: optional("reach_b")?,
    })
}

fn optional_int(field: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_lax_int(raw)
            .map(Some)
            .ok_or_else(|| ApiError::InvalidField {
                path: vec![field.to_string()],
                msg: format!("expected an integer, got {:?}", raw),
            }),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
