//! Data models for the application.

mod project;

pub use project::Project;
