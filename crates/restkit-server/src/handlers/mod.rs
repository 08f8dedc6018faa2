//! HTTP handlers.

pub mod health;
pub mod metrics;
pub mod throttle;
pub mod todos;
