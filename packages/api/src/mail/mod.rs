//! # Mail module — contact-form relay
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`sanitize`] | Validation of untrusted subject/body values: JSON strings with content, trimmed, then capped at 256 / 16384 characters. |
//! | [`MailRelay`] | The seam the HTTP layer talks to. |
//! | [`EmailClient`] | `MailRelay` over a lifecycle-managed [`MailSession`]; re-sanitizes, acquires the session and sends. |
//! | [`SmtpConnector`] | Builds a `lettre` SMTP transport from the `SMTP_*` / `MAIL_*` settings. |
//!
//! The transport is built on the first send and reused afterwards. Missing mail
//! settings surface as [`MailError::Unavailable`] at send time, the same way a
//! refused connection does.

mod client;
pub mod sanitize;

pub use client::{
    EmailClient, MailError, MailRelay, MailSession, MailTransport, OutgoingMail, SmtpConnector,
};

