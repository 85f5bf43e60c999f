//! Wire types for the HTTP boundary: the success envelope, request-body
//! validation and the mapping from failures to status codes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::data::entry::{DatasetPatch, NewDataset, NAME_FIELD, URL_FIELD};
use crate::data::registry::{ErrorKind, Outcome, RegistryError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> From<Outcome<T>> for MessageResponse<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self {
            message: outcome.message,
            data: outcome.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub messages: Vec<String>,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            messages: vec![message.into()],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status: &'static str,
    kind: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [ValidationIssue]>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Invalid request body: {0}")]
    BadRequest(String),
    #[error("Validation failed")]
    Validation(Vec<ValidationIssue>),
    #[error("Route not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Registry(err) => match err.kind() {
                ErrorKind::ConfigurationMissing
                | ErrorKind::ConfigurationCorrupt
                | ErrorKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            },
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(err) => err.kind().as_str(),
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_failed",
            Self::RouteNotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::InvalidPath(_) => "invalid_path",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                Self::Internal(detail) => error!(detail = %detail, "request failed"),
                other => error!(kind = other.kind(), error = %other, "request failed"),
            }
        } else {
            debug!(kind = self.kind(), error = %self, "request rejected");
        }

        let message = self.to_string();
        let errors = match &self {
            Self::Validation(issues) => Some(issues.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            status: "error",
            kind: self.kind(),
            message: &message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

/// Checks an add body: `name` and `url` must both be non-blank strings.
pub fn parse_new_dataset(body: &Value) -> Result<NewDataset, ApiError> {
    let Some(fields) = body.as_object() else {
        return Err(ApiError::Validation(vec![ValidationIssue::new(
            "body",
            "must be a JSON object",
        )]));
    };

    let mut errors = Vec::new();
    let mut required = |field: &str| match fields.get(field) {
        None | Some(Value::Null) => {
            errors.push(ValidationIssue::new(field, "field required"));
            None
        }
        Some(Value::String(value)) if value.trim().is_empty() => {
            errors.push(ValidationIssue::new(field, "must not be empty"));
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.push(ValidationIssue::new(field, "must be a string"));
            None
        }
    };
    let name = required(NAME_FIELD);
    let url = required(URL_FIELD);

    match (name, url) {
        (Some(name), Some(url)) => Ok(NewDataset { name, url }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Checks an update body: any JSON object is a valid patch.
pub fn parse_patch(body: Value) -> Result<DatasetPatch, ApiError> {
    match body {
        Value::Object(fields) => Ok(DatasetPatch::from(fields)),
        _ => Err(ApiError::Validation(vec![ValidationIssue::new(
            "body",
            "must be a JSON object",
        )])),
    }
}
