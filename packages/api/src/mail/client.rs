//! SMTP transport singleton and the contact-mail relay built on top of it.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::sanitize::{sanitize_text, MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH};
use crate::lifecycle::{BoxError, Connector, Lifecycle, LifecycleError};
use crate::settings::{ConfigurationError, MailSettings, SettingsSource};

/// A fully addressed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Something that can deliver an [`OutgoingMail`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), BoxError>;
}

/// A ready transport together with the configured sender and recipient.
pub struct MailSession {
    transport: Box<dyn MailTransport>,
    from: String,
    to: String,
}

impl MailSession {
    pub fn new(transport: Box<dyn MailTransport>, from: String, to: String) -> Self {
        Self {
            transport,
            from,
            to,
        }
    }

    pub fn compose(&self, subject: String, text: String) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject,
            text,
        }
    }

    pub async fn deliver(&self, mail: &OutgoingMail) -> Result<(), BoxError> {
        self.transport.send(mail).await
    }
}

struct SmtpTransport(AsyncSmtpTransport<Tokio1Executor>);

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), BoxError> {
        let message = Message::builder()
            .from(mail.from.parse::<Mailbox>()?)
            .to(mail.to.parse::<Mailbox>()?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text.clone())?;

        self.0.send(message).await?;
        Ok(())
    }
}

/// SMTP relay host for a well-known service name, or the value itself.
fn relay_host(service: &str) -> String {
    match service.to_ascii_lowercase().as_str() {
        "gmail" | "googlemail" => "smtp.gmail.com".into(),
        "outlook" | "outlook365" | "hotmail" => "smtp-mail.outlook.com".into(),
        "yahoo" => "smtp.mail.yahoo.com".into(),
        "icloud" => "smtp.mail.me.com".into(),
        _ => service.to_string(),
    }
}

/// Builds SMTP sessions from the `SMTP_*` and `MAIL_*` settings.
///
/// Releasing a session does no I/O: shutdown only drops the lifecycle's handle
/// to the `lettre` connection pool. Pooled connections are closed when the last
/// `Arc<MailSession>` goes away, so a send still holding a session finishes on it.
#[derive(Debug, Clone)]
pub struct SmtpConnector {
    source: SettingsSource,
}

impl SmtpConnector {
    pub fn new(source: SettingsSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Connector for SmtpConnector {
    type Config = MailSettings;
    type Resource = MailSession;

    fn name(&self) -> &'static str {
        "mail transport"
    }

    fn configure(&self) -> Result<MailSettings, ConfigurationError> {
        self.source.snapshot()?.mail()
    }

    async fn connect(&self, config: MailSettings) -> Result<MailSession, BoxError> {
        // Reject unusable addresses before the first send.
        config.from.parse::<Mailbox>()?;
        config.to.parse::<Mailbox>()?;

        let host = relay_host(&config.service);
        // STARTTLS on 587 when TLS is required, implicit TLS on 465 otherwise.
        let builder = if config.require_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?
        };
        let transport = builder
            .credentials(Credentials::new(config.user, config.password))
            .build();

        Ok(MailSession::new(
            Box::new(SmtpTransport(transport)),
            config.from,
            config.to,
        ))
    }

    /// No-op; the pool closes with its last handle.
    async fn release(&self, _session: &MailSession) -> Result<(), BoxError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email subject or body is invalid")]
    InvalidMessage,

    #[error("mail transport unavailable: {0}")]
    Unavailable(#[from] LifecycleError),

    #[error("email send failed: {0}")]
    Send(#[source] BoxError),
}

/// Relays contact-form messages to the site owner.
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send_email(&self, subject: &str, body: &str) -> Result<(), MailError>;
}

/// [`MailRelay`] backed by a lifecycle-managed [`MailSession`].
pub struct EmailClient<C: Connector<Resource = MailSession>> {
    session: Lifecycle<C>,
}

impl EmailClient<SmtpConnector> {
    pub fn smtp(source: SettingsSource) -> Self {
        Self::new(SmtpConnector::new(source))
    }
}

impl<C: Connector<Resource = MailSession>> EmailClient<C> {
    pub fn new(connector: C) -> Self {
        Self {
            session: Lifecycle::new(connector),
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle<C> {
        &self.session
    }

    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}

#[async_trait]
impl<C: Connector<Resource = MailSession>> MailRelay for EmailClient<C> {
    async fn send_email(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let (Some(subject), Some(text)) = (
            sanitize_text(subject, MAX_SUBJECT_LENGTH),
            sanitize_text(body, MAX_BODY_LENGTH),
        ) else {
            return Err(MailError::InvalidMessage);
        };

        let session = self.session.acquire().await?;
        let mail = session.compose(subject, text);
        session.deliver(&mail).await.map_err(MailError::Send)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ResourceState;
    use crate::settings::tests::TEST_MAIL_ENV;
    use crate::settings::Settings;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Transport that records every message it is asked to send.
    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<OutgoingMail>>>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, mail: &OutgoingMail) -> Result<(), BoxError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err("SMTP connection refused".into());
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    /// Connector handing out sessions over a shared [`RecordingTransport`].
    struct RecordingConnector {
        source: SettingsSource,
        transport: RecordingTransport,
        connects: Arc<AtomicUsize>,
    }

    impl RecordingConnector {
        fn new(source: SettingsSource) -> Self {
            Self {
                source,
                transport: RecordingTransport::default(),
                connects: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        type Config = MailSettings;
        type Resource = MailSession;

        fn name(&self) -> &'static str {
            "recording transport"
        }

        fn configure(&self) -> Result<MailSettings, ConfigurationError> {
            self.source.snapshot()?.mail()
        }

        async fn connect(&self, config: MailSettings) -> Result<MailSession, BoxError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(MailSession::new(
                Box::new(self.transport.clone()),
                config.from,
                config.to,
            ))
        }

        async fn release(&self, _session: &MailSession) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn configured() -> SettingsSource {
        SettingsSource::Fixed(Settings::from_pairs(TEST_MAIL_ENV).unwrap())
    }

    #[tokio::test]
    async fn test_send_email_uses_configured_addresses() {
        let connector = RecordingConnector::new(configured());
        let sent = connector.transport.sent.clone();
        let client = EmailClient::new(connector);

        client.send_email("Test Subject", "Test Body").await.unwrap();

        assert_eq!(
            *sent.lock().unwrap(),
            vec![OutgoingMail {
                from: "site@example.com".into(),
                to: "owner@example.com".into(),
                subject: "Test Subject".into(),
                text: "Test Body".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_send_email_sanitizes_again() {
        let connector = RecordingConnector::new(configured());
        let sent = connector.transport.sent.clone();
        let client = EmailClient::new(connector);

        let subject = format!("  {}  ", "s".repeat(MAX_SUBJECT_LENGTH + 10));
        client.send_email(&subject, "\n body \n").await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].subject, "s".repeat(MAX_SUBJECT_LENGTH));
        assert_eq!(sent[0].text, "body");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_without_connecting() {
        let connector = RecordingConnector::new(configured());
        let connects = connector.connects.clone();
        let client = EmailClient::new(connector);

        let err = client.send_email("   ", "body").await.unwrap_err();

        assert!(matches!(err, MailError::InvalidMessage));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_is_reused_between_sends() {
        let connector = RecordingConnector::new(configured());
        let connects = connector.connects.clone();
        let client = EmailClient::new(connector);

        let (a, b) = tokio::join!(
            client.send_email("one", "first"),
            client.send_email("two", "second")
        );
        a.unwrap();
        b.unwrap();
        client.send_email("three", "third").await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_settings_surface_as_unavailable() {
        let source = SettingsSource::Fixed(Settings::default());
        let connector = RecordingConnector::new(source);
        let connects = connector.connects.clone();
        let client = EmailClient::new(connector);

        let err = client.send_email("Subject", "Body").await.unwrap_err();

        assert!(matches!(
            err,
            MailError::Unavailable(LifecycleError::Configuration(_))
        ));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_send_error() {
        let connector = RecordingConnector::new(configured());
        connector.transport.fail.store(true, Ordering::SeqCst);
        let client = EmailClient::new(connector);

        let err = client.send_email("Subject", "Body").await.unwrap_err();

        assert!(matches!(err, MailError::Send(_)));
        assert_eq!(
            err.to_string(),
            "email send failed: SMTP connection refused"
        );
    }

    #[tokio::test]
    async fn test_shutdown_then_send_rebuilds_session() {
        let connector = RecordingConnector::new(configured());
        let connects = connector.connects.clone();
        let client = EmailClient::new(connector);

        client.send_email("one", "first").await.unwrap();
        client.shutdown().await;
        assert!(client.lifecycle().handle().is_none());
        client.send_email("two", "second").await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_relay_host() {
        assert_eq!(relay_host("gmail"), "smtp.gmail.com");
        assert_eq!(relay_host("Gmail"), "smtp.gmail.com");
        assert_eq!(relay_host("smtp.example.com"), "smtp.example.com");
    }

    #[tokio::test]
    async fn test_smtp_connector_rejects_bad_address() {
        let settings = Settings::from_pairs(
            TEST_MAIL_ENV
                .into_iter()
                .map(|(k, v)| if k == "MAIL_FROM" { (k, "not an address") } else { (k, v) }),
        )
        .unwrap();
        let client = EmailClient::smtp(SettingsSource::Fixed(settings));

        let err = client.send_email("Subject", "Body").await.unwrap_err();

        assert!(matches!(
            err,
            MailError::Unavailable(LifecycleError::Creation { .. })
        ));
    }

    #[tokio::test]
    async fn test_smtp_shutdown_only_drops_lifecycle_handle() {
        let client = EmailClient::smtp(configured());

        let session = client.lifecycle().acquire().await.unwrap();
        assert_eq!(Arc::strong_count(&session), 2);

        client.shutdown().await;

        assert!(client.lifecycle().handle().is_none());
        assert_eq!(client.lifecycle().state(), ResourceState::Closed);
        assert_eq!(Arc::strong_count(&session), 1);
    }
}
