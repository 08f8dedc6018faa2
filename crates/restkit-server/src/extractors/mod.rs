//! Request extractors.

pub mod path;
pub mod query;

pub use path::EntityPath;
pub use query::QueryParams;
