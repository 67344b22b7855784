use dioxus::prelude::*;

use crate::Layout;

#[component]
pub fn NotFoundPage() -> Element {
    rsx! {
        Layout {
            title: "Page Not Found",
            h1 { "404" }
            p { "The page you are looking for does not exist." }
            a { href: "/", "Return home" }
        }
    }
}

#[component]
pub fn ServerErrorPage() -> Element {
    rsx! {
        Layout {
            title: "Server Error",
            h1 { "500" }
            p { "Something went wrong on our end. Please try again later." }
            a { href: "/", "Return home" }
        }
    }
}
