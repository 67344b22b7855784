use dioxus::prelude::*;

use crate::Layout;

struct CreditInfo {
    icon: &'static str,
    intro: &'static str,
    name: &'static str,
    url: &'static str,
}

static CREDITS: [CreditInfo; 6] = [
    CreditInfo {
        icon: "fa-solid fa-server",
        intro: "Served by",
        name: "axum",
        url: "https://github.com/tokio-rs/axum",
    },
    CreditInfo {
        icon: "fa-solid fa-code",
        intro: "Pages rendered with",
        name: "Dioxus",
        url: "https://dioxuslabs.com/",
    },
    CreditInfo {
        icon: "fa-solid fa-envelope",
        intro: "Mail delivered by",
        name: "lettre",
        url: "https://lettre.rs/",
    },
    CreditInfo {
        icon: "fa-solid fa-paintbrush",
        intro: "Splash animation drawn with",
        name: "p5.js",
        url: "https://p5js.org/",
    },
    CreditInfo {
        icon: "fa-brands fa-bootstrap",
        intro: "Styled with",
        name: "Bootstrap",
        url: "https://getbootstrap.com/",
    },
    CreditInfo {
        icon: "fa-solid fa-trophy",
        intro: "Icons provided by",
        name: "Font Awesome",
        url: "https://fontawesome.com/",
    },
];

#[component]
pub fn AcknowledgementsPage() -> Element {
    rsx! {
        Layout {
            title: "Acknowledgements",
            h1 { class: "mb-4", "Acknowledgements" }
            ul {
                class: "list-unstyled",
                for credit in CREDITS.iter() {
                    Credit {
                        key: "{credit.name}",
                        icon: credit.icon,
                        intro: credit.intro,
                        name: credit.name,
                        url: credit.url,
                    }
                }
            }
        }
    }
}

#[component]
pub fn Credit(
    #[props(into)] icon: String,
    #[props(into)] intro: String,
    #[props(into)] name: String,
    #[props(into)] url: String,
) -> Element {
    rsx! {
        li {
            class: "mb-2",
            i { class: "{icon} me-2" }
            "{intro} "
            a { href: "{url}", "{name}" }
        }
    }
}
