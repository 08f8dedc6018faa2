//! In-memory todo storage.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use restkit_core::{Clock, Result, SystemClock, ToolkitError};
use serde::Serialize;
use tracing::debug;

use crate::choices::Choice;
use crate::todos::model::{NewTodo, Todo, TodoPatch, TodoPriority, TodoStatus};

const RESOURCE: &str = "Todo";

fn not_found() -> ToolkitError {
    ToolkitError::not_found(RESOURCE, format!("The requested {} was not found.", RESOURCE))
}

/// Equality filters; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub id: Option<u64>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
}

impl TodoFilter {
    pub fn by_id(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    fn matches(&self, todo: &Todo) -> bool {
        self.id.is_none_or(|id| todo.id == id)
            && self.status.is_none_or(|s| todo.status == s)
            && self.priority.is_none_or(|p| todo.priority == p)
            && self
                .search
                .as_ref()
                .is_none_or(|needle| todo.title.to_lowercase().contains(&needle.to_lowercase()))
    }
}

/// Counts returned by the `stats` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    pub total: usize,
    pub overdue: usize,
    pub by_status: IndexMap<&'static str, usize>,
}

/// Todos kept in memory, ordered by id.
#[derive(Debug)]
pub struct TodoRepository {
    todos: RwLock<BTreeMap<u64, Todo>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl Default for TodoRepository {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TodoRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            todos: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn list(&self, filter: &TodoFilter) -> Vec<Todo> {
        self.todos
            .read()
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Returns the first todo matching `filter`, or a not-found error with
    /// `The requested Todo was not found.`.
    pub fn get_object(&self, filter: &TodoFilter) -> Result<Todo> {
        self.todos
            .read()
            .values()
            .find(|t| filter.matches(t))
            .cloned()
            .ok_or_else(not_found)
    }

    pub fn create(&self, new: NewTodo) -> Result<Todo> {
        let title = validate_title(&new.title)?;
        let now = self.clock.now();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let mut todo = Todo {
            id,
            title,
            description: new.description,
            due_date: new.due_date,
            priority: new.priority,
            status: new.status,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        if todo.status == TodoStatus::Completed {
            todo.mark_completed(now);
        }

        self.todos.write().insert(id, todo.clone());
        debug!(id, "Todo created");
        Ok(todo)
    }

    pub fn update(&self, id: u64, patch: TodoPatch) -> Result<Todo> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let now = self.clock.now();

        let mut todos = self.todos.write();
        let todo = todos.get_mut(&id).ok_or_else(not_found)?;

        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if patch.due_date.is_some() {
            todo.due_date = patch.due_date;
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
        }
        match patch.status {
            Some(TodoStatus::Completed) if todo.status != TodoStatus::Completed => {
                todo.mark_completed(now);
            },
            Some(status) => {
                todo.status = status;
                if status != TodoStatus::Completed {
                    todo.completed_at = None;
                }
            },
            None => {},
        }
        todo.updated_at = now;

        Ok(todo.clone())
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.todos
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    pub fn complete(&self, id: u64) -> Result<Todo> {
        let now = self.clock.now();
        let mut todos = self.todos.write();
        let todo = todos.get_mut(&id).ok_or_else(not_found)?;
        todo.mark_completed(now);
        Ok(todo.clone())
    }

    pub fn stats(&self, filter: &TodoFilter) -> TodoStats {
        let now = self.clock.now();
        let todos = self.list(filter);

        let mut by_status: IndexMap<&'static str, usize> =
            TodoStatus::ALL.iter().map(|s| (s.value(), 0)).collect();
        for todo in &todos {
            *by_status.entry(todo.status.value()).or_default() += 1;
        }

        TodoStats {
            total: todos.len(),
            overdue: todos.iter().filter(|t| t.is_overdue(now)).count(),
            by_status,
        }
    }

    pub fn len(&self) -> usize {
        self.todos.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.read().is_empty()
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ToolkitError::validation("title", "This field may not be blank."));
    }
    if title.chars().count() > 255 {
        return Err(ToolkitError::validation(
            "title",
            "Ensure this field has no more than 255 characters.",
        ));
    }
    Ok(title.to_string())
}
