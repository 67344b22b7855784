//! # Project model
//!
//! One row of the `projects` table. The id is read as a signed 64-bit integer so
//! both `INT` and `INT UNSIGNED` columns map onto it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A portfolio entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub project_title: String,
    pub image_url: Option<String>,
    pub project_description: Option<String>,
}

impl Project {
    /// Link to the project's detail page.
    pub fn href(&self) -> String {
        format!("/projects/{}", self.id)
    }

    pub fn description(&self) -> &str {
        self.project_description.as_deref().unwrap_or_default()
    }
}
