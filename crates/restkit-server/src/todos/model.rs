//! Todo model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::choices::{Choice, ChoiceFields, pairs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Choice for TodoPriority {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Critical];

    fn value(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl Choice for TodoStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::InProgress, Self::Completed, Self::Archived];

    fn value(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TodoPriority,
    pub status: TodoStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = TodoStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TodoStatus::Completed && self.due_date.is_some_and(|due| due < now)
    }
}

impl ChoiceFields for Todo {
    const MODEL_NAME: &'static str = "Todo";

    fn field_choices(field: &str) -> Option<Vec<(&'static str, &'static str)>> {
        match field {
            "priority" => Some(pairs::<TodoPriority>()),
            "status" => Some(pairs::<TodoStatus>()),
            "id" | "title" | "description" | "due_date" | "completed_at" | "created_at"
            | "updated_at" => Some(Vec::new()),
            _ => None,
        }
    }
}

/// Payload of `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TodoPriority,
    #[serde(default)]
    pub status: TodoStatus,
}

/// Payload of `PUT/PATCH /todos/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TodoPriority>,
    pub status: Option<TodoStatus>,
}
