//! # Web crate — HTTP server for the portfolio site
//!
//! Wires the [`api`] resources and the [`ui`] pages into an axum router and runs
//! it until SIGINT/SIGTERM.
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/` | Home page with a random featured project |
//! | `GET` | `/projects` | Project grid |
//! | `GET` | `/projects/{id}` | Project page, 404 for unknown or non-numeric ids |
//! | `GET` | `/contact` | Contact form |
//! | `GET` | `/acknowledgements` | Credits |
//! | `POST` | `/mail` | Contact-mail relay (JSON `{ "subject", "message" }`) |
//! | `*` | anything else | Static files from the public directory, then the 404 page |
//!
//! Every route sits behind permissive CORS, request tracing, a panic catcher that
//! renders the 500 page, and a per-client rate limit of 100 requests per minute.
//!
//! ## Lifecycle
//!
//! [`start_server`] loads `.env`, tries to open the database pool (a failure is
//! logged and the site keeps serving), then listens on `0.0.0.0:{PORT}`. After a
//! shutdown signal the server drains in-flight requests, then releases the mail
//! transport and the database pool.

use std::any::Any;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use api::{DatabaseCatalog, EmailClient, Settings, SettingsSource};

pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

use rate_limit::rate_limit;
use routes::{
    acknowledgements_handler, contact_handler, home_handler, mail_handler, not_found_handler,
    project_handler, projects_handler,
};
pub use state::AppState;

/// Build the application router. Unmatched paths are looked up under `public_dir`.
pub fn router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let static_files = ServeDir::new(public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found_handler.into_service());

    Router::new()
        .route("/", get(home_handler))
        .route("/projects", get(projects_handler))
        .route("/projects/{id}", get(project_handler))
        .route("/contact", get(contact_handler))
        .route("/acknowledgements", get(acknowledgements_handler))
        .route("/mail", post(mail_handler))
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(ui::render_server_error()),
    )
        .into_response()
}

pub async fn start_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("Failed to load settings")?;
    let port = settings.port()?;
    let public_dir = settings.public_dir();

    let source = SettingsSource::Environment;
    let database = api::db::connection_pool(source.clone());
    if let Err(e) = database.ensure_initialized().await {
        error!("Database unavailable, continuing without it: {e}");
    }
    let mailer = Arc::new(EmailClient::smtp(source));
    let projects = Arc::new(DatabaseCatalog::from_database(database.clone()));

    let state = AppState::new(projects, mailer.clone());
    let app = router(state, &public_dir);

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Portfolio listening at http://localhost:{port}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("HTTP server closed");

    mailer.shutdown().await;
    database.shutdown().await;
    info!("Database connection pool closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("SIGINT signal received: closing HTTP server"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received: closing HTTP server");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::lifecycle::LifecycleError;
    use api::mail::sanitize::MAX_SUBJECT_LENGTH;
    use api::{
        ConfigurationError, MailError, MailRelay, MemoryCatalog, Project, ProjectCatalog,
        ProjectError,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request};
    use parking_lot::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::rate_limit::RateLimiter;

    const PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../public");

    #[derive(Default)]
    struct RecordingRelay {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl MailRelay for RecordingRelay {
        async fn send_email(&self, subject: &str, body: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Send("SMTP connection refused".into()));
            }
            self.sent.lock().push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct UnavailableCatalog;

    #[async_trait]
    impl ProjectCatalog for UnavailableCatalog {
        async fn all_projects(&self) -> Result<Vec<Project>, ProjectError> {
            Err(ProjectError::Unavailable(LifecycleError::Configuration(
                ConfigurationError::Missing(vec!["MYSQL_HOST"]),
            )))
        }
    }

    fn projects() -> Vec<Project> {
        vec![
            Project {
                id: 1,
                project_title: "Portfolio".into(),
                image_url: None,
                project_description: Some("This website.".into()),
            },
            Project {
                id: 2,
                project_title: "Ray Tracer".into(),
                image_url: Some("/images/ray-tracer.png".into()),
                project_description: Some("A small path tracer.".into()),
            },
        ]
    }

    fn app_with(projects: Arc<dyn ProjectCatalog>, mailer: Arc<dyn MailRelay>) -> Router {
        router(AppState::new(projects, mailer), PUBLIC_DIR)
    }

    fn app() -> (Router, Arc<RecordingRelay>) {
        let relay = Arc::new(RecordingRelay::default());
        let app = app_with(Arc::new(MemoryCatalog::new(projects())), relay.clone());
        (app, relay)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn mail_request(body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mail")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_mail_sends_email() {
        let (app, relay) = app();

        let (status, body) = send(
            app,
            mail_request(r#"{"subject":"Test Subject","message":"Test Body"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Email sent successfully.");
        assert_eq!(
            *relay.sent.lock(),
            vec![("Test Subject".to_string(), "Test Body".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mail_sanitizes_fields() {
        let (app, relay) = app();
        let subject = format!("  {}  ", "a".repeat(MAX_SUBJECT_LENGTH + 1));
        let payload = serde_json::json!({ "subject": subject, "message": "\n\tHello\n" });

        let (status, _) = send(app, mail_request(payload.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        let sent = relay.sent.lock();
        assert_eq!(sent[0].0, "a".repeat(MAX_SUBJECT_LENGTH));
        assert_eq!(sent[0].1, "Hello");
    }

    #[tokio::test]
    async fn test_mail_rejects_invalid_fields() {
        let payloads = [
            r#"{"message":"Test Body"}"#,
            r#"{"subject":"Test Subject"}"#,
            r#"{}"#,
            r#"{"subject":"","message":"Test Body"}"#,
            r#"{"subject":"Test Subject","message":"   \n\t "}"#,
            r#"{"subject":123,"message":"Test Body"}"#,
            r#"{"subject":"Test Subject","message":null}"#,
            r#"{"subject":{},"message":"Test Body"}"#,
            r#"{"subject":"Test Subject","message":["Test Body"]}"#,
            r#"{"subject":true,"message":"Test Body"}"#,
            r#"{"subject":"Test Subject","body":"Test Body"}"#,
        ];

        for payload in payloads {
            let (app, relay) = app();
            let (status, body) = send(app, mail_request(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body, "Invalid request format.");
            assert!(relay.sent.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_mail_rejects_malformed_json() {
        for payload in ["{not json", "", "[]", "\"subject\""] {
            let (app, relay) = app();
            let (status, body) = send(app, mail_request(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body, "Invalid request format.");
            assert!(relay.sent.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_mail_requires_json_object() {
        let payloads = [
            r#"["Test Subject","Test Body"]"#,
            r#"[["subject","Test Subject"],["message","Test Body"]]"#,
            "42",
            "null",
        ];

        for payload in payloads {
            let (app, relay) = app();
            let (status, body) = send(app, mail_request(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body, "Invalid request format.");
            assert!(relay.sent.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_mail_transport_failure_is_generic_500() {
        let relay = Arc::new(RecordingRelay {
            fail: true,
            ..Default::default()
        });
        let app = app_with(Arc::new(MemoryCatalog::new(projects())), relay);

        let (status, body) = send(
            app,
            mail_request(r#"{"subject":"Test Subject","message":"Test Body"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error sending email.");
    }

    #[tokio::test]
    async fn test_mail_without_configuration_is_500() {
        let mailer = Arc::new(EmailClient::smtp(SettingsSource::Fixed(Settings::default())));
        let app = app_with(Arc::new(MemoryCatalog::default()), mailer);

        let (status, body) = send(
            app,
            mail_request(r#"{"subject":"Test Subject","message":"Test Body"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error sending email.");
    }

    #[tokio::test]
    async fn test_home_page() {
        let (app, _) = app();
        let (status, body) = send(app, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Featured Project"));
    }

    #[tokio::test]
    async fn test_listings_degrade_when_catalog_unavailable() {
        for uri in ["/", "/projects"] {
            let app = app_with(
                Arc::new(UnavailableCatalog),
                Arc::new(RecordingRelay::default()),
            );
            let (status, body) = send(app, get_request(uri)).await;

            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(!body.contains("Featured Project"));
        }
    }

    #[tokio::test]
    async fn test_projects_page_lists_projects() {
        let (app, _) = app();
        let (status, body) = send(app, get_request("/projects")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Portfolio"));
        assert!(body.contains("Ray Tracer"));
    }

    #[tokio::test]
    async fn test_project_page() {
        let (app, _) = app();
        let (status, body) = send(app, get_request("/projects/2")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ray Tracer"));
        assert!(body.contains("A small path tracer."));
    }

    #[tokio::test]
    async fn test_unknown_project_is_404() {
        for uri in ["/projects/99", "/projects/abc", "/projects/1.5"] {
            let (app, _) = app();
            let (status, body) = send(app, get_request(uri)).await;

            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.contains("404"));
        }
    }

    #[tokio::test]
    async fn test_project_page_with_catalog_unavailable_is_500() {
        let app = app_with(
            Arc::new(UnavailableCatalog),
            Arc::new(RecordingRelay::default()),
        );
        let (status, body) = send(app, get_request("/projects/1")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("500"));
    }

    #[tokio::test]
    async fn test_static_pages() {
        for uri in ["/contact", "/acknowledgements"] {
            let (app, _) = app();
            let (status, body) = send(app, get_request(uri)).await;

            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body.starts_with("<!DOCTYPE html>"));
        }
    }

    #[tokio::test]
    async fn test_public_files_are_served() {
        let (app, _) = app();
        let response = app
            .oneshot(get_request("/scripts/contact-email.js"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"), "{content_type}");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_page() {
        let (app, _) = app();
        let (status, body) = send(app, get_request("/does-not-exist")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("The page you are looking for does not exist."));
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let state = AppState::new(
            Arc::new(MemoryCatalog::default()),
            Arc::new(RecordingRelay::default()),
        )
        .with_limiter(RateLimiter::new(2, Duration::from_secs(60)));
        let app = router(state, PUBLIC_DIR);

        for _ in 0..2 {
            let response = app.clone().oneshot(get_request("/contact")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get_request("/contact")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/contact")
            .header("origin", "https://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
