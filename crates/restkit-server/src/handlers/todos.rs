//! Todos endpoint handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::choices::choices_for;
use crate::error::AppError;
use crate::extractors::{EntityPath, QueryParams};
use crate::state::AppState;
use crate::todos::Todo;

/// Fields exposed by `GET /todos/choices`.
const CHOICE_FIELDS: &[&str] = &["priority", "status"];

fn entity_id(path: &EntityPath) -> Result<String, AppError> {
    path.validate().map_err(AppError::BadRequest)?;
    Ok(path.decoded_id())
}

/// GET /todos
#[instrument(skip_all)]
pub async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<QueryParams>,
) -> Result<Json<Value>, AppError> {
    state.todos().list(&query).await.map(Json)
}

/// POST /todos
#[instrument(skip_all)]
pub async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.todos().create(payload).await?;
    tracing::info!(id = %created["id"], "Todo created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /todos/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(path): Path<EntityPath>,
) -> Result<Json<Value>, AppError> {
    let id = entity_id(&path)?;
    state.todos().retrieve(&id).await.map(Json)
}

/// PUT|PATCH /todos/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(path): Path<EntityPath>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let id = entity_id(&path)?;
    state.todos().update(&id, payload).await.map(Json)
}

/// DELETE /todos/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(path): Path<EntityPath>,
) -> Result<StatusCode, AppError> {
    let id = entity_id(&path)?;
    state.todos().destroy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /todos/stats (cached per query)
#[instrument(skip_all)]
pub async fn todo_stats(
    State(state): State<AppState>,
    Query(query): Query<QueryParams>,
) -> Result<Json<Value>, AppError> {
    let todos = state.todos();
    todos
        .cached_action("stats", None, &query, || todos.resource().stats(&query))
        .await
        .map(Json)
}

/// GET /todos/{id}/summary (cached per id)
#[instrument(skip_all, fields(id = %path.id))]
pub async fn todo_summary(
    State(state): State<AppState>,
    Path(path): Path<EntityPath>,
) -> Result<Json<Value>, AppError> {
    let id = entity_id(&path)?;
    let todos = state.todos();
    todos
        .cached_action("summary", Some(&id), &QueryParams::new(), || {
            todos.resource().summary(&id)
        })
        .await
        .map(Json)
}

/// POST /todos/{id}/complete
#[instrument(skip_all, fields(id = %path.id))]
pub async fn complete_todo(
    State(state): State<AppState>,
    Path(path): Path<EntityPath>,
) -> Result<Json<Value>, AppError> {
    let id = entity_id(&path)?;
    let todos = state.todos();
    todos
        .mutation(Some(&id), || todos.resource().complete(&id))
        .await
        .map(Json)
}

/// GET /todos/choices
#[instrument(skip_all)]
pub async fn todo_choices() -> Result<Json<Value>, AppError> {
    let choices = choices_for::<Todo>(Some(CHOICE_FIELDS))?;
    Ok(Json(json!({ "choices": choices })))
}
