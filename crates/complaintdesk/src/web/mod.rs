//! HTTP surface: the resident form, the JSON API, the admin listing and the
//! QR code page.

pub mod qr;
pub mod render;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::complaint::{ComplaintCandidate, ComplaintRecord};
use crate::config::{Config, SiteConfig};
use crate::error::{Error, IntakeError, ProvisionError, Result};
use crate::service::{self, ProvisionOutcome};
use crate::storage::ComplaintGateway;
use crate::validation::{self, FieldViolation};

use self::qr::QrRequest;
use self::render::FormView;

const LOCK_POISONED: &str = "Storage is unavailable after an earlier failure; restart the server.";

/// Gateway handle shared by every request.
pub type SharedGateway = Arc<Mutex<dyn ComplaintGateway>>;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: SharedGateway,
    site: Arc<SiteConfig>,
    public_url: Arc<str>,
    database: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("site", &self.site)
            .field("public_url", &self.public_url)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state around a gateway and the loaded configuration.
    pub fn new(gateway: impl ComplaintGateway + 'static, config: &Config) -> Self {
        Self {
            gateway: Arc::new(Mutex::new(gateway)),
            site: Arc::new(config.site.clone()),
            public_url: Arc::from(config.server.public_url.as_str()),
            database: Arc::from(config.database_path().display().to_string()),
        }
    }

    /// Run one storage operation with the gateway locked.
    ///
    /// Returns `None` if an earlier holder panicked.
    fn with_gateway<T>(&self, op: impl FnOnce(&dyn ComplaintGateway) -> T) -> Option<T> {
        match self.gateway.lock() {
            Ok(gateway) => Some(op(&*gateway)),
            Err(_) => {
                error!("Storage lock poisoned");
                None
            }
        }
    }

    fn submit(&self, candidate: &ComplaintCandidate) -> std::result::Result<i64, IntakeError> {
        self.with_gateway(|g| service::submit(g, candidate))
            .unwrap_or_else(|| Err(IntakeError::persistence(LOCK_POISONED)))
    }

    fn list(&self) -> std::result::Result<Vec<ComplaintRecord>, IntakeError> {
        self.with_gateway(|g| service::list_complaints(g))
            .unwrap_or_else(|| Err(IntakeError::persistence(LOCK_POISONED)))
    }

    fn ensure_table(&self) -> std::result::Result<ProvisionOutcome, ProvisionError> {
        self.with_gateway(|g| service::ensure_table(g))
            .unwrap_or_else(|| Err(ProvisionError::new(LOCK_POISONED)))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page).post(submit_form))
        .route("/api/validate", post(validate_api))
        .route("/api/complaints", get(list_api).post(submit_api))
        .route("/admin", get(admin_page))
        .route("/admin/provision", post(provision))
        .route("/qr-code", get(qr_page))
        .route("/qr-code.svg", get(qr_svg))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::ServerBind { addr, source })?;
    info!("Complaint form listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn form_page(State(state): State<AppState>) -> Html<String> {
    Html(render::complaint_form(
        &state.site,
        &FormView::default(),
        Local::now().date_naive(),
    ))
}

async fn submit_form(
    State(state): State<AppState>,
    Form(candidate): Form<ComplaintCandidate>,
) -> (StatusCode, Html<String>) {
    match state.submit(&candidate) {
        Ok(_) => (StatusCode::OK, Html(render::confirmation(&state.site))),
        Err(err) => {
            let view = FormView::after_failure(&candidate, &err);
            let page = render::complaint_form(&state.site, &view, Local::now().date_naive());
            (intake_status(&err), Html(page))
        }
    }
}

fn intake_status(err: &IntakeError) -> StatusCode {
    match err {
        IntakeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IntakeError::SchemaMissing => StatusCode::SERVICE_UNAVAILABLE,
        IntakeError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Response body of `POST /api/validate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the candidate passed every rule.
    pub valid: bool,
    /// Violations, in form order.
    pub errors: Vec<ValidationReportEntry>,
}

/// One violation in a [`ValidationReport`].
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationReportEntry {
    /// Form field name.
    pub field: String,
    /// What the resident should fix.
    pub message: String,
}

impl From<&FieldViolation> for ValidationReportEntry {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field: violation.field.name().to_string(),
            message: violation.message.clone(),
        }
    }
}

async fn validate_api(Json(candidate): Json<ComplaintCandidate>) -> Json<ValidationReport> {
    let errors = match validation::validate(&candidate) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(ValidationReportEntry::from).collect(),
    };
    Json(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}

async fn submit_api(
    State(state): State<AppState>,
    Json(candidate): Json<ComplaintCandidate>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.submit(&candidate) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "status": "ok", "id": id }))),
        Err(err) => (intake_status(&err), Json(intake_body(&err))),
    }
}

async fn list_api(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.list() {
        Ok(complaints) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "complaints": complaints })),
        ),
        Err(err) => (intake_status(&err), Json(intake_body(&err))),
    }
}

fn intake_body(err: &IntakeError) -> serde_json::Value {
    let mut body = serde_json::to_value(err).unwrap_or_else(|_| json!({}));
    if let serde_json::Value::Object(map) = &mut body {
        map.insert("message".to_string(), json!(err.to_string()));
    }
    body
}

/// Query string of `GET /admin`.
#[derive(Debug, Default, Deserialize)]
struct AdminQuery {
    provisioned: Option<String>,
}

async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> (StatusCode, Html<String>) {
    let listing = state.list();
    let notice = match query.provisioned.as_deref() {
        Some("created") => Some(ProvisionOutcome::Created.message()),
        Some("exists") => Some(ProvisionOutcome::AlreadyExists.message()),
        _ => None,
    };
    let status = match &listing {
        Err(IntakeError::Persistence { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    let page = render::admin(&state.site, &state.database, &listing, notice);
    (status, Html(page))
}

async fn provision(State(state): State<AppState>) -> Response {
    match state.ensure_table() {
        Ok(outcome) => {
            info!("{}", outcome.message());
            let flag = match outcome {
                ProvisionOutcome::Created => "created",
                ProvisionOutcome::AlreadyExists => "exists",
            };
            Redirect::to(&format!("/admin?provisioned={flag}")).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render::provision_failed(&state.site, &state.database, &err)),
        )
            .into_response(),
    }
}

/// Query string of the QR code routes.
#[derive(Debug, Default, Deserialize)]
struct QrQuery {
    url: Option<String>,
    size: Option<String>,
}

impl QrQuery {
    fn into_request(self, default_url: &str) -> QrRequest {
        QrRequest::new(self.url.as_deref(), self.size.as_deref(), default_url)
    }
}

async fn qr_page(
    State(state): State<AppState>,
    Query(query): Query<QrQuery>,
) -> (StatusCode, Html<String>) {
    let request = query.into_request(&state.public_url);
    match request.to_inline_svg() {
        Ok(svg) => (
            StatusCode::OK,
            Html(render::qr_page(&state.site, &request.url, request.size, Ok(svg.as_str()))),
        ),
        Err(err) => {
            let reason = err.to_string();
            (
                StatusCode::BAD_REQUEST,
                Html(render::qr_page(&state.site, &request.url, request.size, Err(reason.as_str()))),
            )
        }
    }
}

async fn qr_svg(State(state): State<AppState>, Query(query): Query<QrQuery>) -> Response {
    let request = query.into_request(&state.public_url);
    match request.to_svg() {
        Ok(svg) => (
            [
                (header::CONTENT_TYPE, "image/svg+xml".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", qr::DOWNLOAD_FILENAME),
                ),
            ],
            svg,
        )
            .into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn healthz() -> &'static str {
    "ok"
}
