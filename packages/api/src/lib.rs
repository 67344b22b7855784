//! # API crate — shared resources and data access for the portfolio site
//!
//! Everything the HTTP layer needs that is not HTTP: settings, the lifecycle of
//! the two long-lived resources (MySQL pool and SMTP transport), the contact-mail
//! relay and the project catalog.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`lifecycle`] | Single-flight `ensure_initialized` / `shutdown` for shared resources |
//! | [`settings`] | `.env` / `config.toml` / environment settings, validated per resource |
//! | [`db`] | MySQL connection pool on top of [`lifecycle`] |
//! | [`mail`] | Input sanitization and the SMTP-backed [`MailRelay`] |
//! | [`models`] | Database models (`Project`) |
//! | [`projects`] | Read-only [`ProjectCatalog`] over memory or the database |

pub mod db;
pub mod lifecycle;
pub mod mail;
pub mod models;
pub mod projects;
pub mod settings;

pub use lifecycle::{Lifecycle, LifecycleError, ResourceState};
pub use mail::{EmailClient, MailError, MailRelay};
pub use models::Project;
pub use projects::{DatabaseCatalog, MemoryCatalog, ProjectCatalog, ProjectError};
pub use settings::{ConfigurationError, Settings, SettingsSource};
