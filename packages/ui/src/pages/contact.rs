use dioxus::prelude::*;

use crate::Layout;

const CONTACT_SCRIPT: &str = "/scripts/contact-email.js";

/// Contact form. Submission is handled by the page script, which posts JSON to `/mail`.
#[component]
pub fn ContactPage() -> Element {
    rsx! {
        Layout {
            title: "Contact",
            h1 { class: "mb-4", "Contact" }
            form {
                id: "contact-form",
                class: "needs-validation",
                novalidate: true,
                label {
                    class: "form-label w-100 mb-3",
                    "Name"
                    input { id: "name", class: "form-control disable-toggle", r#type: "text", required: true }
                }
                label {
                    class: "form-label w-100 mb-3",
                    "Email"
                    input { id: "email", class: "form-control disable-toggle", r#type: "email", required: true }
                }
                label {
                    class: "form-label w-100 mb-3",
                    "Message"
                    textarea { id: "message", class: "form-control disable-toggle", rows: "6", required: true }
                }
                button { class: "btn btn-primary disable-toggle", r#type: "submit", "Send" }
                p { id: "form-response", class: "mt-3" }
            }
            script { src: CONTACT_SCRIPT }
        }
    }
}
