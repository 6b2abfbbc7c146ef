use axum::{
    extract::rejection::{BytesRejection, FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_path_to_error::Segment;
use thiserror::Error;
use tracing::warn;

use crate::models::{ValidationErrorBody, ValidationIssue};

/// Reasons a `/predict` request is rejected before scoring.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing field `{field}`")]
    MissingField { field: String },

    /// A field is present but its value does not fit the bout schema.
    #[error("{msg}")]
    InvalidField { path: Vec<String>, msg: String },

    #[error("invalid form body: {0}")]
    InvalidForm(String),

    #[error("expected `Content-Type: application/json` or `application/x-www-form-urlencoded`")]
    UnsupportedMediaType,

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl ApiError {
    /// Machine-readable kind reported in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "json_invalid",
            ApiError::NotAnObject => "model_type",
            ApiError::MissingField { .. } => "missing",
            ApiError::InvalidField { .. } => "type_error",
            ApiError::InvalidForm(_) => "form_invalid",
            ApiError::UnsupportedMediaType => "content_type",
            ApiError::PayloadTooLarge => "too_large",
            ApiError::BodyRead(_) => "body_read",
        }
    }

    /// Location of the problem, `["body"]` followed by the field path, if any.
    pub fn loc(&self) -> Vec<String> {
        let mut loc = vec!["body".to_string()];
        match self {
            ApiError::MissingField { field } => loc.push(field.clone()),
            ApiError::InvalidField { path, .. } => loc.extend(path.iter().cloned()),
            _ => {}
        }
        loc
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn body(&self) -> ValidationErrorBody {
        ValidationErrorBody {
            detail: vec![ValidationIssue {
                kind: self.kind().to_string(),
                loc: self.loc(),
                msg: self.to_string(),
            }],
        }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ApiError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path: Vec<String> = err
            .path()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Map { key } => Some(key.clone()),
                Segment::Seq { index } => Some(index.to_string()),
                _ => None,
            })
            .collect();
        let msg = err.into_inner().to_string();
        match missing_field_name(&msg) {
            Some(field) => {
                let mut full = path;
                full.push(field.to_string());
                ApiError::MissingField {
                    field: full.join("."),
                }
            }
            None => ApiError::InvalidField { path, msg },
        }
    }
}

/// Field name from serde's own "missing field `name`" message.
fn missing_field_name(msg: &str) -> Option<&str> {
    msg.strip_prefix("missing field `")?.split('`').next()
}

fn body_read_error(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BodyRead(text)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        body_read_error(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        match rejection {
            FormRejection::InvalidFormContentType(_) => ApiError::UnsupportedMediaType,
            FormRejection::BytesRejection(e) => body_read_error(e.status(), e.body_text()),
            other => ApiError::InvalidForm(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Rejected prediction request: {}", self);
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoutFeatures;

    fn decode_error(json: &str) -> ApiError {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        serde_path_to_error::deserialize::<_, BoutFeatures>(value)
            .unwrap_err()
            .into()
    }

    #[test]
    fn missing_field_points_at_field() {
        let err = decode_error(r#"{"fighter_a":"X"}"#);
        assert_eq!(err.kind(), "missing");
        assert_eq!(err.loc(), vec!["body", "fighter_b"]);
        assert_eq!(err.to_string(), "missing field `fighter_b`");
    }

    #[test]
    fn wrong_type_is_a_type_error() {
        let err = decode_error(r#"{"fighter_a":"X","fighter_b":"Y","reach_a":"long"}"#);
        assert_eq!(err.kind(), "type_error");
        assert_eq!(err.loc(), vec!["body", "reach_a"]);
    }

    #[test]
    fn location_ignores_field_names_inside_values() {
        let err = decode_error(r#"{"fighter_a":"X","fighter_b":"Y","reach_a":"age_b"}"#);
        assert_eq!(err.kind(), "type_error");
        assert_eq!(err.loc(), vec!["body", "reach_a"]);
    }

    #[test]
    fn kind_ignores_missing_field_text_inside_values() {
        let err = decode_error(r#"{"fighter_a":"X","fighter_b":"Y","reach_a":"missing field"}"#);
        assert_eq!(err.kind(), "type_error");
        assert_eq!(err.loc(), vec!["body", "reach_a"]);
    }

    #[test]
    fn non_string_fighter_is_a_type_error() {
        let err = decode_error(r#"{"fighter_a":7,"fighter_b":"Y"}"#);
        assert_eq!(err.kind(), "type_error");
        assert_eq!(err.loc(), vec!["body", "fighter_a"]);
    }

    #[test]
    fn missing_field_name_parsing() {
        assert_eq!(missing_field_name("missing field `age_a`"), Some("age_a"));
        assert_eq!(missing_field_name("invalid value: string \"missing field `x`\""), None);
    }

    #[test]
    fn oversized_body_is_413() {
        let err = body_read_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.kind(), "too_large");
    }

    #[test]
    fn decoding_errors_are_unprocessable() {
        let errors = [
            ApiError::InvalidJson("eof".into()),
            ApiError::NotAnObject,
            ApiError::UnsupportedMediaType,
            ApiError::BodyRead("closed".into()),
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let body = err.body();
            assert_eq!(body.detail.len(), 1);
            assert_eq!(body.detail[0].loc, vec!["body"]);
        }
    }
}
