//! HTTP handlers for record CRUD and aggregate reports.

pub mod entity;
pub mod report;
pub use entity::*;
pub use report::*;
