//! One component per route, plus the error pages.

mod acknowledgements;
mod contact;
mod errors;
mod home;
mod project;
mod projects;

pub use acknowledgements::{AcknowledgementsPage, Credit};
pub use contact::ContactPage;
pub use errors::{NotFoundPage, ServerErrorPage};
pub use home::HomePage;
pub use project::ProjectPage;
pub use projects::ProjectsPage;
