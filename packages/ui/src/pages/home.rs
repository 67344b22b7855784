use api::Project;
use dioxus::prelude::*;

use crate::{Layout, ProjectCard};

const P5_JS: &str = "https://cdn.jsdelivr.net/npm/p5@1.11.1/lib/p5.min.js";
const SPLASH_SCRIPT: &str = "/scripts/splash.js";

#[component]
pub fn HomePage(#[props(!optional)] featured: Option<Project>) -> Element {
    rsx! {
        Layout {
            title: "Home",
            div {
                class: "splash",
                canvas { id: "splashCanvas" }
            }
            section {
                class: "py-5 text-center",
                h1 { class: "display-5", "Hello, welcome to my portfolio." }
                p { class: "lead", "Software, experiments and the occasional side project." }
                a { class: "btn btn-outline-primary me-2", href: "/projects", "See projects" }
                a { class: "btn btn-outline-secondary", href: "/contact", "Get in touch" }
            }
            if let Some(project) = featured {
                section {
                    class: "featured-project",
                    h2 { class: "h4 mb-3", "Featured Project" }
                    ProjectCard { project }
                }
            }
            script { src: P5_JS }
            script { src: SPLASH_SCRIPT }
        }
    }
}
