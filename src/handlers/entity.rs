//! Entity CRUD handlers: create, update, partial update, list, read, delete.
//! Generic over the entity type; one instantiation per resource.

use crate::error::{ApiError, AppError};
use crate::model::Entity;
use crate::response::{alert_headers, created, no_content, ok_with_headers, Alert};
use crate::state::AppState;
use crate::store::Stored;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Bound shared by every resource handler.
pub trait Resource: Stored {}

impl<E: Stored> Resource for E {}

fn parse_id<E: Entity>(id_str: &str) -> Result<E::Id, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {} id: {}", E::ENTITY_NAME, id_str)))
}

fn parse_body<E: Entity>(body: Result<Json<Value>, JsonRejection>) -> Result<E, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if !value.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(format!("invalid {}: {}", E::ENTITY_NAME, e)))
}

fn rendered_id<E: Entity>(entity: &E) -> String {
    entity.id().map(ToString::to_string).unwrap_or_default()
}

/// POST /api/{resource}
pub async fn create<E: Resource>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let api_err = |e| ApiError::new(state.app_name.clone(), e);
    let entity: E = parse_body(body).map_err(api_err)?;
    let saved = state.service::<E>().create(entity).await.map_err(api_err)?;
    let id = rendered_id(&saved);
    let headers = alert_headers(&state.app_name, E::ENTITY_NAME, Alert::Created, &id);
    Ok(created(&format!("/api/{}/{}", E::PATH, id), headers, saved))
}

/// PUT /api/{resource}/:id
pub async fn update<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let api_err = |e| ApiError::new(state.app_name.clone(), e);
    let entity: E = parse_body(body).map_err(api_err)?;
    let saved = state.service::<E>().update(&id, entity).await.map_err(api_err)?;
    let headers = alert_headers(&state.app_name, E::ENTITY_NAME, Alert::Updated, &rendered_id(&saved));
    Ok(ok_with_headers(headers, saved))
}

/// PATCH /api/{resource}/:id (`application/json` or `application/merge-patch+json`)
pub async fn partial_update<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let api_err = |e| ApiError::new(state.app_name.clone(), e);
    let patch: E = parse_body(body).map_err(api_err)?;
    let saved = state.service::<E>().partial_update(&id, patch).await.map_err(api_err)?;
    let headers = alert_headers(&state.app_name, E::ENTITY_NAME, Alert::Updated, &rendered_id(&saved));
    Ok(ok_with_headers(headers, saved))
}

/// GET /api/{resource}
pub async fn list<E: Resource>(State(state): State<AppState>) -> Result<Json<Vec<E>>, ApiError> {
    state
        .service::<E>()
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::new(state.app_name.clone(), e))
}

/// GET /api/{resource}/:id
pub async fn read<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let api_err = |e| ApiError::new(state.app_name.clone(), e);
    let id = parse_id::<E>(&id).map_err(api_err)?;
    match state.service::<E>().read(&id).await.map_err(api_err)? {
        Some(entity) => Ok(Json(entity).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// DELETE /api/{resource}/:id
pub async fn delete<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let api_err = |e| ApiError::new(state.app_name.clone(), e);
    let key = parse_id::<E>(&id).map_err(api_err)?;
    state.service::<E>().delete(&key).await.map_err(api_err)?;
    Ok(no_content(alert_headers(&state.app_name, E::ENTITY_NAME, Alert::Deleted, &id)))
}
