//! # UI crate — server-rendered pages for the portfolio site
//!
//! Pages are plain dioxus components rendered to strings with `dioxus-ssr`; no
//! client-side runtime is shipped. The `render_*` functions are what the HTTP
//! handlers call.
//!
//! | Component | Route |
//! |-----------|-------|
//! | [`HomePage`] | `/` |
//! | [`ProjectsPage`] | `/projects` |
//! | [`ProjectPage`] | `/projects/{id}` |
//! | [`ContactPage`] | `/contact` |
//! | [`AcknowledgementsPage`] | `/acknowledgements` |
//! | [`NotFoundPage`] / [`ServerErrorPage`] | 404 / 500 responses |

use api::Project;
use dioxus::prelude::*;

mod layout;
pub use layout::{Layout, Navbar};

mod project_card;
pub use project_card::ProjectCard;

mod pages;
pub use pages::{
    AcknowledgementsPage, ContactPage, Credit, HomePage, NotFoundPage, ProjectPage,
    ProjectsPage, ServerErrorPage,
};

/// Render a page component to a complete HTML document.
pub fn render_page(page: Element) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\">{}</html>",
        dioxus_ssr::render_element(page)
    )
}

pub fn render_home(featured: Option<Project>) -> String {
    render_page(rsx! { HomePage { featured } })
}

pub fn render_projects(projects: Vec<Project>) -> String {
    render_page(rsx! { ProjectsPage { projects } })
}

pub fn render_project(project: Project) -> String {
    render_page(rsx! { ProjectPage { project } })
}

pub fn render_contact() -> String {
    render_page(rsx! { ContactPage {} })
}

pub fn render_acknowledgements() -> String {
    render_page(rsx! { AcknowledgementsPage {} })
}

pub fn render_not_found() -> String {
    render_page(rsx! { NotFoundPage {} })
}

pub fn render_server_error() -> String {
    render_page(rsx! { ServerErrorPage {} })
}
