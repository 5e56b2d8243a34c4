//! Typed errors and HTTP mapping.

use crate::response::{header_pair, DEFAULT_APP_NAME};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("validation: {0}")]
    Validation(String),
}

/// Machine-readable code of a rejected request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKey {
    IdExists,
    IdNull,
    IdInvalid,
    IdNotFound,
}

impl ErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::IdExists => "idexists",
            ErrorKey::IdNull => "idnull",
            ErrorKey::IdInvalid => "idinvalid",
            ErrorKey::IdNotFound => "idnotfound",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Client broke an identifier or field rule for `entity`.
    #[error("{message}")]
    Validation {
        entity: &'static str,
        key: ErrorKey,
        message: String,
    },
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(entity: &'static str, key: ErrorKey, message: impl Into<String>) -> Self {
        AppError::Validation {
            entity,
            key,
            message: message.into(),
        }
    }

    /// Renders the error with `X-{app_name}-*` headers.
    pub fn into_response_for(self, app_name: &str) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Validation { key, .. } => (StatusCode::BAD_REQUEST, key.as_str()),
            AppError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    return StatusCode::NOT_FOUND.into_response();
                }
                tracing::error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
        };
        let entity = match &self {
            AppError::Validation { entity, .. } => Some(*entity),
            _ => None,
        };
        let mut headers = HeaderMap::new();
        if let Some((name, value)) = header_pair(app_name, "error", &format!("error.{}", code)) {
            headers.insert(name, value);
        }
        if let Some(entity) = entity {
            if let Some((name, value)) = header_pair(app_name, "params", entity) {
                headers.insert(name, value);
            }
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                entity: entity.map(str::to_string),
                message: self.to_string(),
            },
        };
        (status, headers, Json(body)).into_response()
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_for(DEFAULT_APP_NAME)
    }
}

/// An [`AppError`] raised by a resource handler, rendered with that resource's application name.
#[derive(Debug)]
pub struct ApiError {
    app_name: Arc<str>,
    error: AppError,
}

impl ApiError {
    pub fn new(app_name: Arc<str>, error: AppError) -> Self {
        ApiError { app_name, error }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.error.into_response_for(&self.app_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_headers() {
        let resp = AppError::validation("employeeJob", ErrorKey::IdExists, "A new job cannot already have an ID")
            .into_response_for("employeeApp");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["x-employeeapp-error"], "error.idexists");
        assert_eq!(resp.headers()["x-employeeapp-params"], "employeeJob");
    }

    #[test]
    fn not_found_has_no_body_headers() {
        let resp = AppError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get("content-type").is_none());
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let resp = AppError::Db(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_store_errors_are_internal() {
        let resp = AppError::Db(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
