use crate::infra::{local_now, AppState};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use immigration_ops::error::AppError;
use immigration_ops::workflows::cases::{
    ActionAck, CaseDashboard, CaseField, CaseFilter, CasePage, CaseStats,
};
use immigration_ops::workflows::deadlines::DeadlineBoard;
use immigration_ops::workflows::documents::{
    AdmissionReceipt, ArtifactId, ArtifactUpload, CompletionSummary, ReconcileError,
    RequirementStatus, VisaRoute,
};
use immigration_ops::workflows::intake::{ClientIntake, ConsentRecord, SessionSnapshot};
use immigration_ops::workflows::rules::{
    recent_rule_updates, rules_affecting, RuleUpdate, RECENT_RULE_UPDATES,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Bodies just over the admission limit must still reach the admission check.
const BODY_LIMIT_HEADROOM: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub(crate) struct ConsentRequest {
    pub(crate) consented: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DemoRequest {
    pub(crate) enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OutreachQuery {
    #[serde(default)]
    pub(crate) phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OutreachResponse {
    pub(crate) message: String,
    pub(crate) whatsapp_link: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChecklistResponse {
    pub(crate) route: Option<VisaRoute>,
    pub(crate) checklist: Vec<RequirementStatus>,
    pub(crate) summary: CompletionSummary,
    pub(crate) missing: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RulesQuery {
    #[serde(default)]
    pub(crate) route: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RuleUpdateView {
    pub(crate) published_label: String,
    #[serde(flatten)]
    pub(crate) update: RuleUpdate,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CaseListQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) urgency: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) descending: bool,
    #[serde(default)]
    pub(crate) page: Option<usize>,
    #[serde(default)]
    pub(crate) page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CaseListResponse {
    pub(crate) page: CasePage,
    pub(crate) page_label: String,
    pub(crate) stats: CaseStats,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdateRequest {
    pub(crate) field: CaseField,
    pub(crate) value: String,
}

pub(crate) fn router(max_upload_bytes: u64) -> Router {
    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_HEADROOM);

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/session", get(session_endpoint).delete(clear_session))
        .route("/api/v1/intake", post(save_intake))
        .route("/api/v1/consent", post(record_consent))
        .route("/api/v1/demo", post(toggle_demo))
        .route("/api/v1/deadlines", get(deadline_board))
        .route("/api/v1/outreach", get(outreach_endpoint))
        .route("/api/v1/documents/checklist", get(document_checklist))
        .route("/api/v1/documents/:file_name", put(upload_document))
        .route("/api/v1/artifacts/:artifact_id", delete(remove_artifact))
        .route("/api/v1/rules", get(rule_updates_endpoint))
        .route("/api/v1/cases", get(list_cases))
        .route("/api/v1/cases/:case_id/fields", post(update_case_field))
        .route("/api/v1/cases/:case_id/reminder", post(send_case_reminder))
        .layer(DefaultBodyLimit::max(body_limit))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn session_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.session()?;
    Ok(Json(session.snapshot(local_now())))
}

pub(crate) async fn clear_session(
    Extension(state): Extension<AppState>,
) -> Result<StatusCode, AppError> {
    state.session()?.clear()?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn save_intake(
    Extension(state): Extension<AppState>,
    Json(intake): Json<ClientIntake>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut session = state.session()?;
    session.save_intake(intake)?;
    Ok(Json(session.snapshot(local_now())))
}

pub(crate) async fn record_consent(
    Extension(state): Extension<AppState>,
    Json(request): Json<ConsentRequest>,
) -> Result<Json<ConsentRecord>, AppError> {
    let record = state.session()?.record_consent(request.consented)?;
    Ok(Json(record))
}

pub(crate) async fn toggle_demo(
    Extension(state): Extension<AppState>,
    Json(request): Json<DemoRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut session = state.session()?;
    session.set_demo_mode(request.enabled)?;
    Ok(Json(session.snapshot(local_now())))
}

/// Read-only view; notifications are only raised by the background ticker.
pub(crate) async fn deadline_board(
    Extension(state): Extension<AppState>,
) -> Result<Json<DeadlineBoard>, AppError> {
    let session = state.session()?;
    Ok(Json(session.tracker().board(local_now())))
}

pub(crate) async fn outreach_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<OutreachQuery>,
) -> Result<Json<OutreachResponse>, AppError> {
    let session = state.session()?;
    let phone = query.phone.unwrap_or_default();
    Ok(Json(OutreachResponse {
        message: session.outreach_message(),
        whatsapp_link: session.whatsapp_link(&phone),
    }))
}

pub(crate) async fn document_checklist(
    Extension(state): Extension<AppState>,
) -> Result<Json<ChecklistResponse>, AppError> {
    let session = state.session()?;
    let reconciler = session.reconciler();
    Ok(Json(ChecklistResponse {
        route: reconciler.route(),
        checklist: reconciler.checklist(),
        summary: reconciler.summary(),
        missing: reconciler
            .missing_requirements()
            .into_iter()
            .map(|requirement| requirement.label)
            .collect(),
    }))
}

/// Recent rule changes, or every change touching `route` when given.
pub(crate) async fn rule_updates_endpoint(
    Query(query): Query<RulesQuery>,
) -> Result<Json<Vec<RuleUpdateView>>, AppError> {
    let updates: Vec<&RuleUpdate> = match query.route.as_deref() {
        Some(label) => {
            let route = VisaRoute::from_label(label)
                .ok_or_else(|| ReconcileError::UnknownCategory(label.to_string()))?;
            rules_affecting(route)
        }
        None => recent_rule_updates(query.limit.unwrap_or(RECENT_RULE_UPDATES))
            .iter()
            .collect(),
    };
    Ok(Json(
        updates
            .into_iter()
            .map(|update| RuleUpdateView {
                published_label: update.published_label(),
                update: *update,
            })
            .collect(),
    ))
}

/// Takes the MIME type from `Content-Type` when present, else guesses it from
/// the file name.
pub(crate) async fn upload_document(
    Extension(state): Extension<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<AdmissionReceipt>), AppError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

    let upload = ArtifactUpload::new(file_name, mime_type, body.to_vec());
    let receipt = state.session()?.admit(upload)?;
    info!(artifact = %receipt.artifact_id, size = %receipt.size_label, "document uploaded");
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub(crate) async fn remove_artifact(
    Extension(state): Extension<AppState>,
    Path(artifact_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: ArtifactId = artifact_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("artifact {artifact_id}")))?;
    state.session()?.remove_artifact(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_cases(
    Extension(state): Extension<AppState>,
    Query(query): Query<CaseListQuery>,
) -> Result<Json<CaseListResponse>, AppError> {
    let cases = state.case_store.get_cases().await?;

    let mut dashboard = CaseDashboard::new(cases);
    if let Some(page_size) = query.page_size {
        dashboard.set_page_size(page_size);
    }
    if let Some(column) = query.sort.as_deref() {
        if dashboard.sort_state().column != column {
            dashboard.sort_by(column);
        }
        if dashboard.sort_state().ascending == query.descending {
            dashboard.sort_by(column);
        }
    }
    dashboard.apply_filter(CaseFilter {
        search: query.search,
        status: query.status.filter(|value| !value.is_empty()),
        urgency: query.urgency.filter(|value| !value.is_empty()),
    });
    if let Some(page) = query.page {
        dashboard.go_to_page(page);
    }

    let page = dashboard.current_page();
    Ok(Json(CaseListResponse {
        page_label: page.label(),
        page,
        stats: dashboard.stats(),
    }))
}

pub(crate) async fn update_case_field(
    Extension(state): Extension<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<FieldUpdateRequest>,
) -> Result<Json<ActionAck>, AppError> {
    let ack = state
        .case_store
        .update_field(&case_id, request.field, &request.value)
        .await?;
    Ok(Json(ack))
}

pub(crate) async fn send_case_reminder(
    Extension(state): Extension<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<ActionAck>, AppError> {
    let cases = state.case_store.get_cases().await?;
    let record = cases
        .into_iter()
        .find(|record| record.case_id == case_id)
        .ok_or_else(|| AppError::NotFound(format!("case {case_id}")))?;

    let ack = state
        .case_store
        .send_reminder(&record.case_id, &record.email, &record.name)
        .await?;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, Response};
    use chrono::Local;
    use immigration_ops::config::{DeadlineConfig, DocumentConfig};
    use immigration_ops::storage::InMemorySessionStore;
    use immigration_ops::workflows::cases::CaseStoreClient;
    use immigration_ops::workflows::intake::{demo_intake, CaseSession};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    const MAX_UPLOAD: u64 = 2048;

    fn app() -> Router {
        let session = CaseSession::open(
            Arc::new(InMemorySessionStore::new()),
            Local::now().naive_local(),
            DeadlineConfig::default(),
            DocumentConfig {
                max_upload_bytes: MAX_UPLOAD,
            },
        )
        .expect("session opens");
        let case_store = CaseStoreClient::new(
            "https://script.google.com/macros/s/YOUR_SCRIPT_ID/exec",
            Duration::from_secs(1),
        )
        .expect("client builds");

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            session: Arc::new(Mutex::new(session)),
            case_store: Arc::new(case_store),
        };
        router(MAX_UPLOAD).layer(Extension(state))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    fn upload_request(file_name: &str, content_type: Option<&str>, bytes: usize) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/v1/documents/{file_name}"));
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder
            .body(Body::from(vec![7u8; bytes]))
            .expect("request builds")
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.expect("request handled")
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let app = app();
        let health = send(&app, empty_request(Method::GET, "/health")).await;
        assert_eq!(health.status(), StatusCode::OK);

        let ready = send(&app, empty_request(Method::GET, "/ready")).await;
        assert_eq!(ready.status(), StatusCode::OK);
        assert_eq!(body_json(ready).await["status"], "ready");
    }

    #[tokio::test]
    async fn rules_feed_defaults_to_recent_and_filters_by_route() {
        let app = app();
        let recent = send(&app, empty_request(Method::GET, "/api/v1/rules")).await;
        assert_eq!(recent.status(), StatusCode::OK);
        let recent = body_json(recent).await;
        assert_eq!(recent.as_array().expect("array").len(), 3);
        assert_eq!(recent[0]["published_label"], "4 April 2025");
        assert_eq!(recent[0]["affected_routes"][1], "Health and Care Worker");

        let student = send(
            &app,
            empty_request(Method::GET, "/api/v1/rules?route=Student%20Visa"),
        )
        .await;
        let student = body_json(student).await;
        assert_eq!(student.as_array().expect("array").len(), 1);
        assert_eq!(student[0]["title"], "Student Work Hour Restrictions");

        let unknown = send(
            &app,
            empty_request(Method::GET, "/api/v1/rules?route=Golden%20Visa"),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_intake_lists_field_errors() {
        let app = app();
        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/intake",
                json!({ "clientName": "", "clientEmail": "not-an-email", "visaType": "" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .filter_map(|field| field["field"].as_str())
            .collect();
        assert!(fields.contains(&"clientName"));
        assert!(fields.contains(&"clientEmail"));
    }

    #[tokio::test]
    async fn intake_then_uploads_drive_the_checklist() {
        let app = app();
        let intake = serde_json::to_value(demo_intake()).expect("intake json");
        let saved = send(&app, json_request(Method::POST, "/api/v1/intake", intake)).await;
        assert_eq!(saved.status(), StatusCode::OK);
        assert_eq!(body_json(saved).await["route"], "Spouse Visa");

        let refused = send(&app, upload_request("passport.pdf", Some("application/pdf"), 10)).await;
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);

        let consent = send(
            &app,
            json_request(Method::POST, "/api/v1/consent", json!({ "consented": true })),
        )
        .await;
        assert_eq!(consent.status(), StatusCode::OK);

        let passport = send(&app, upload_request("passport.pdf", None, 10)).await;
        assert_eq!(passport.status(), StatusCode::CREATED);
        let receipt = body_json(passport).await;
        assert_eq!(receipt["type_label"], "PDF");
        let artifact_id = receipt["artifact_id"].as_str().expect("id").to_string();

        let gif = send(&app, upload_request("photo.gif", Some("image/gif"), 10)).await;
        assert_eq!(gif.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let oversized = send(
            &app,
            upload_request("marriage.pdf", Some("application/pdf"), MAX_UPLOAD as usize + 1),
        )
        .await;
        assert_eq!(oversized.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let message = body_json(oversized).await["error"]
            .as_str()
            .map(str::to_string)
            .expect("error message");
        assert!(message.contains("too large"));

        let checklist = send(&app, empty_request(Method::GET, "/api/v1/documents/checklist")).await;
        let body = body_json(checklist).await;
        assert_eq!(body["summary"]["satisfied"], 1);
        assert_eq!(body["summary"]["total"], 6);
        assert_eq!(body["missing"].as_array().map(Vec::len), Some(5));

        let removed = send(
            &app,
            empty_request(Method::DELETE, &format!("/api/v1/artifacts/{artifact_id}")),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);

        let again = send(
            &app,
            empty_request(Method::DELETE, &format!("/api/v1/artifacts/{artifact_id}")),
        )
        .await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn demo_mode_populates_deadlines_and_clear_resets() {
        let app = app();
        let toggled = send(
            &app,
            json_request(Method::POST, "/api/v1/demo", json!({ "enabled": true })),
        )
        .await;
        assert_eq!(toggled.status(), StatusCode::OK);
        assert_eq!(body_json(toggled).await["demo_mode"], true);

        let board = body_json(send(&app, empty_request(Method::GET, "/api/v1/deadlines")).await).await;
        assert_eq!(board["entries"].as_array().map(Vec::len), Some(3));
        assert!(board["notifications"].as_array().is_some_and(Vec::is_empty));

        let outreach = body_json(
            send(&app, empty_request(Method::GET, "/api/v1/outreach?phone=%2B44%207700%20900123")).await,
        )
        .await;
        assert!(outreach["whatsapp_link"]
            .as_str()
            .is_some_and(|link| link.starts_with("https://wa.me/+447700900123?text=")));

        let cleared = send(&app, empty_request(Method::DELETE, "/api/v1/session")).await;
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
        let board = body_json(send(&app, empty_request(Method::GET, "/api/v1/deadlines")).await).await;
        assert_eq!(board["entries"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn unconfigured_case_store_is_unavailable() {
        let app = app();
        let response = send(&app, empty_request(Method::GET, "/api/v1/cases?status=Completed")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let invalid = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/cases/C-001/fields",
                json!({ "field": "Urgency", "value": "Whenever" }),
            ),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
