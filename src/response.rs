//! Response helpers: entity alert headers and the Location of created resources.

use axum::{
    http::{header::LOCATION, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application name used in `X-{app}-*` headers when none is configured.
pub const DEFAULT_APP_NAME: &str = "employeeApp";

/// Which change an alert reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alert {
    Created,
    Updated,
    Deleted,
}

impl Alert {
    fn as_str(&self) -> &'static str {
        match self {
            Alert::Created => "created",
            Alert::Updated => "updated",
            Alert::Deleted => "deleted",
        }
    }
}

/// `X-{app_name}-{suffix}: {value}`, or `None` when either part is not a valid header.
pub fn header_pair(app_name: &str, suffix: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(format!("X-{}-{}", app_name, suffix).as_bytes()).ok()?;
    let value = HeaderValue::from_str(value).ok()?;
    Some((name, value))
}

/// `X-{app}-alert: {app}.{entity}.{created|updated|deleted}` and `X-{app}-params: {id}`.
pub fn alert_headers(app_name: &str, entity_name: &str, alert: Alert, id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let message = format!("{}.{}.{}", app_name, entity_name, alert.as_str());
    if let Some((name, value)) = header_pair(app_name, "alert", &message) {
        headers.insert(name, value);
    }
    if let Some((name, value)) = header_pair(app_name, "params", id) {
        headers.insert(name, value);
    }
    headers
}

/// 201 with `Location` and alert headers.
pub fn created<T: Serialize>(location: &str, mut headers: HeaderMap, body: T) -> Response {
    if let Ok(value) = HeaderValue::from_str(location) {
        headers.insert(LOCATION, value);
    }
    (StatusCode::CREATED, headers, Json(body)).into_response()
}

/// 200 with alert headers.
pub fn ok_with_headers<T: Serialize>(headers: HeaderMap, body: T) -> Response {
    (StatusCode::OK, headers, Json(body)).into_response()
}

/// 204 with alert headers.
pub fn no_content(headers: HeaderMap) -> Response {
    (StatusCode::NO_CONTENT, headers).into_response()
}
