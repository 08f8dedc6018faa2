//! Demo "todos" service built on the cached view set.

pub mod model;
pub mod repository;
pub mod resource;

pub use model::{NewTodo, Todo, TodoPatch, TodoPriority, TodoStatus};
pub use repository::{TodoFilter, TodoRepository, TodoStats};
pub use resource::{BASENAME, TodoResource};

/// Custom actions of the todos view set whose responses are cached.
pub const CACHED_ACTIONS: &[&str] = &["stats", "summary"];
