use dioxus::prelude::*;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js";
const FONT_AWESOME_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.7.2/css/all.min.css";
const SITE_CSS: &str = "/style/style.css";

/// `head` and `body` shared by every page. [`crate::render_page`] adds the `html` shell.
#[component]
pub fn Layout(#[props(into)] title: String, children: Element) -> Element {
    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{title}" }
            link { rel: "stylesheet", href: BOOTSTRAP_CSS }
            link { rel: "stylesheet", href: FONT_AWESOME_CSS }
            link { rel: "stylesheet", href: SITE_CSS }
        }
        body {
            Navbar {}
            main { class: "container py-4", {children} }
            footer {
                class: "container py-3 border-top text-muted",
                a { href: "/acknowledgements", "Acknowledgements" }
            }
            script { src: BOOTSTRAP_JS }
        }
    }
}

#[component]
pub fn Navbar() -> Element {
    rsx! {
        nav {
            class: "navbar navbar-expand bg-body-tertiary",
            div {
                class: "container",
                a { class: "navbar-brand", href: "/", "Portfolio" }
                ul {
                    class: "navbar-nav",
                    NavLink { href: "/projects", label: "Projects" }
                    NavLink { href: "/contact", label: "Contact" }
                }
            }
        }
    }
}

#[component]
fn NavLink(#[props(into)] href: String, #[props(into)] label: String) -> Element {
    rsx! {
        li {
            class: "nav-item",
            a { class: "nav-link", href: "{href}", "{label}" }
        }
    }
}
