use api::Project;
use dioxus::prelude::*;

use crate::Layout;

#[component]
pub fn ProjectPage(project: Project) -> Element {
    rsx! {
        Layout {
            title: project.project_title.clone(),
            article {
                class: "project",
                h1 { "{project.project_title}" }
                if let Some(image_url) = project.image_url.as_deref() {
                    img { class: "img-fluid rounded mb-4", src: "{image_url}", alt: "{project.project_title}" }
                }
                p { class: "project-description", "{project.description()}" }
                a { href: "/projects", "Back to projects" }
            }
        }
    }
}
