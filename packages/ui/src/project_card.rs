use api::Project;
use dioxus::prelude::*;

/// Summary card linking to a project's page.
#[component]
pub fn ProjectCard(project: Project) -> Element {
    let href = project.href();

    rsx! {
        div {
            class: "card project-card",
            if let Some(image_url) = project.image_url.as_deref() {
                img { class: "card-img-top", src: "{image_url}", alt: "{project.project_title}" }
            }
            div {
                class: "card-body",
                h5 { class: "card-title", "{project.project_title}" }
                p { class: "card-text", "{project.description()}" }
                a { class: "btn btn-primary", href: "{href}", "View project" }
            }
        }
    }
}
