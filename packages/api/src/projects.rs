//! # Projects — read-only portfolio catalog
//!
//! [`ProjectCatalog`] is the lookup surface the pages use. Two implementations:
//!
//! | Type | Backing store |
//! |------|---------------|
//! | [`MemoryCatalog`] | A fixed `Vec<Project>`, for tests and database-less runs. |
//! | [`DatabaseCatalog`] | The `projects` table, loaded once through a [`Lifecycle`] and served from that snapshot. |
//!
//! A failed load leaves the snapshot unset; the next lookup tries again.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::Database;
use crate::lifecycle::{BoxError, Connector, Lifecycle, LifecycleError};
use crate::models::Project;
use crate::settings::ConfigurationError;

const ALL_PROJECTS: &str =
    "SELECT CAST(id AS SIGNED) AS id, project_title, image_url, project_description FROM projects";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProjectError {
    #[error("project catalog unavailable: {0}")]
    Unavailable(#[from] LifecycleError),
}

#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// Every project, in store order.
    async fn all_projects(&self) -> Result<Vec<Project>, ProjectError>;

    async fn project_by_id(&self, id: i64) -> Result<Option<Project>, ProjectError> {
        Ok(self.all_projects().await?.into_iter().find(|p| p.id == id))
    }

    async fn project_ids(&self) -> Result<Vec<i64>, ProjectError> {
        Ok(self.all_projects().await?.iter().map(|p| p.id).collect())
    }

    async fn is_valid_project_id(&self, id: i64) -> Result<bool, ProjectError> {
        Ok(self.project_ids().await?.contains(&id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    projects: Vec<Project>,
}

impl MemoryCatalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }
}

#[async_trait]
impl ProjectCatalog for MemoryCatalog {
    async fn all_projects(&self) -> Result<Vec<Project>, ProjectError> {
        Ok(self.projects.clone())
    }
}

/// Loads the `projects` table over the shared pool.
#[derive(Debug, Clone)]
pub struct ProjectQuery {
    database: Database,
}

impl ProjectQuery {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Connector for ProjectQuery {
    type Config = ();
    type Resource = Vec<Project>;

    fn name(&self) -> &'static str {
        "project catalog"
    }

    fn configure(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }

    async fn connect(&self, _config: ()) -> Result<Vec<Project>, BoxError> {
        let pool = self.database.acquire().await?;
        let projects = sqlx::query_as::<_, Project>(ALL_PROJECTS)
            .fetch_all(pool.as_ref())
            .await?;
        tracing::debug!(count = projects.len(), "Loaded project catalog");
        Ok(projects)
    }

    async fn release(&self, _projects: &Vec<Project>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Catalog served from a lifecycle-managed snapshot.
pub struct CachedCatalog<C: Connector<Resource = Vec<Project>>> {
    snapshot: Lifecycle<C>,
}

pub type DatabaseCatalog = CachedCatalog<ProjectQuery>;

impl DatabaseCatalog {
    pub fn from_database(database: Database) -> Self {
        Self::new(ProjectQuery::new(database))
    }
}

impl<C: Connector<Resource = Vec<Project>>> CachedCatalog<C> {
    pub fn new(connector: C) -> Self {
        Self {
            snapshot: Lifecycle::new(connector),
        }
    }

    async fn snapshot(&self) -> Result<Arc<Vec<Project>>, ProjectError> {
        self.snapshot.acquire().await.map_err(|e| {
            tracing::error!("Failed to load projects: {e}");
            ProjectError::from(e)
        })
    }

    /// Drop the snapshot so the next lookup reloads it.
    pub async fn invalidate(&self) {
        self.snapshot.shutdown().await;
    }
}

#[async_trait]
impl<C: Connector<Resource = Vec<Project>>> ProjectCatalog for CachedCatalog<C> {
    async fn all_projects(&self) -> Result<Vec<Project>, ProjectError> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    async fn project_by_id(&self, id: i64) -> Result<Option<Project>, ProjectError> {
        Ok(self.snapshot().await?.iter().find(|p| p.id == id).cloned())
    }
}
