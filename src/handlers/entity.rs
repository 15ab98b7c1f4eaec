//! Record CRUD handlers, generic over the entity type: list, read, create, update, delete.

use crate::error::AppError;
use crate::extractors::RecordId;
use crate::model::Entity;
use crate::response::{created, ok};
use crate::state::AppState;
use crate::store::Document;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<Document, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list<E: Entity>(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = state.records.list::<E>().await?;
    Ok(ok(rows))
}

pub async fn read<E: Entity>(
    State(state): State<AppState>,
    id: RecordId<E>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.records.get::<E>(id.get()).await?;
    Ok(ok(row))
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = state.records.create::<E>(body).await?;
    Ok(created(row))
}

pub async fn update<E: Entity>(
    State(state): State<AppState>,
    id: RecordId<E>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = state.records.update::<E>(id.get(), body).await?;
    Ok(ok(row))
}

pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    id: RecordId<E>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.records.delete::<E>(id.get()).await?;
    Ok(ok(row))
}
