use api::Project;
use dioxus::prelude::*;

use crate::{Layout, ProjectCard};

/// Cards per grid row.
const MAX_COLUMNS: usize = 3;

#[component]
pub fn ProjectsPage(projects: Vec<Project>) -> Element {
    let rows: Vec<Vec<Project>> = projects.chunks(MAX_COLUMNS).map(<[Project]>::to_vec).collect();
    let empty = rows.is_empty();

    rsx! {
        Layout {
            title: "Projects",
            h1 { class: "mb-4", "Projects" }
            if empty {
                p { class: "text-muted", "No projects yet." }
            }
            for (index, row) in rows.into_iter().enumerate() {
                ProjectRow { key: "{index}", projects: row }
            }
        }
    }
}

#[component]
fn ProjectRow(projects: Vec<Project>) -> Element {
    rsx! {
        div {
            class: "row project-row",
            for project in projects {
                div {
                    key: "{project.id}",
                    class: "col-md-4 mb-4",
                    ProjectCard { project: project.clone() }
                }
            }
        }
    }
}
