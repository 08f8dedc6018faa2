//! The todos resource: query parsing, pagination and payload validation
//! on top of [`TodoRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::choices::Choice;
use crate::config::PaginationSettings;
use crate::error::AppError;
use crate::extractors::query::QueryParams;
use crate::pagination::{PageRequest, paginate};
use crate::todos::model::{NewTodo, TodoPatch, TodoPriority, TodoStatus};
use crate::todos::repository::{TodoFilter, TodoRepository};
use crate::viewset::Resource;

pub const BASENAME: &str = "todos";

#[derive(Debug, Clone)]
pub struct TodoResource {
    repository: Arc<TodoRepository>,
    pagination: PaginationSettings,
}

impl TodoResource {
    pub fn new(repository: Arc<TodoRepository>, pagination: PaginationSettings) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    pub fn repository(&self) -> &TodoRepository {
        &self.repository
    }

    /// `GET /todos/stats`: counts of the filtered todos.
    pub async fn stats(&self, query: &QueryParams) -> Result<Value, AppError> {
        let filter = filter_from_query(query)?;
        to_json(self.repository.stats(&filter))
    }

    /// `GET /todos/{id}/summary`.
    pub async fn summary(&self, id: &str) -> Result<Value, AppError> {
        let todo = self.repository.get_object(&TodoFilter::by_id(parse_id(id)?))?;
        let now = self.repository.now();

        Ok(json!({
            "id": todo.id,
            "title": todo.title,
            "status": todo.status.label(),
            "priority": todo.priority.label(),
            "overdue": todo.is_overdue(now),
        }))
    }

    /// `POST /todos/{id}/complete`.
    pub async fn complete(&self, id: &str) -> Result<Value, AppError> {
        let todo = self.repository.complete(parse_id(id)?)?;
        to_json(todo)
    }
}

#[async_trait]
impl Resource for TodoResource {
    fn basename(&self) -> &str {
        BASENAME
    }

    /// `01`, `+1` and `1` name the same todo.
    fn canonical_id(&self, id: &str) -> Result<String, AppError> {
        parse_id(id).map(|id| id.to_string())
    }

    async fn list(&self, query: &QueryParams) -> Result<Value, AppError> {
        let filter = filter_from_query(query)?;
        let request = PageRequest::from_query(query, &self.pagination)?;
        let todos = self.repository.list(&filter);
        paginate(todos, request, query, &format!("/{}", BASENAME))
    }

    async fn retrieve(&self, id: &str) -> Result<Value, AppError> {
        let todo = self.repository.get_object(&TodoFilter::by_id(parse_id(id)?))?;
        to_json(todo)
    }

    async fn create(&self, payload: Value) -> Result<Value, AppError> {
        let new: NewTodo = from_payload(payload)?;
        to_json(self.repository.create(new)?)
    }

    async fn update(&self, id: &str, payload: Value) -> Result<Value, AppError> {
        let id = parse_id(id)?;
        let patch: TodoPatch = from_payload(payload)?;
        to_json(self.repository.update(id, patch)?)
    }

    async fn destroy(&self, id: &str) -> Result<(), AppError> {
        Ok(self.repository.delete(parse_id(id)?)?)
    }
}

/// Ids that are not numbers can never match a todo.
fn parse_id(id: &str) -> Result<u64, AppError> {
    id.parse()
        .map_err(|_| AppError::not_found("The requested Todo was not found."))
}

fn filter_from_query(query: &QueryParams) -> Result<TodoFilter, AppError> {
    Ok(TodoFilter {
        id: None,
        status: choice_param::<TodoStatus>(query, "status")?,
        priority: choice_param::<TodoPriority>(query, "priority")?,
        search: query
            .get("search")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    })
}

fn choice_param<C: Choice + Copy>(query: &QueryParams, name: &str) -> Result<Option<C>, AppError> {
    match query.get(name) {
        None | Some("") => Ok(None),
        Some(raw) => C::from_value(raw).map(Some).ok_or_else(|| {
            AppError::bad_request(format!("Select a valid choice. {} is not one of the available choices.", raw))
        }),
    }
}

fn from_payload<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::bad_request(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
