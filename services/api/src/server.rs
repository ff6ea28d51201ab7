use crate::cli::ServeArgs;
use crate::infra::{local_now, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use immigration_ops::config::AppConfig;
use immigration_ops::error::AppError;
use immigration_ops::storage::InMemorySessionStore;
use immigration_ops::telemetry;
use immigration_ops::workflows::cases::CaseStoreClient;
use immigration_ops::workflows::deadlines::{ReevaluationScheduler, SystemClock, TracingNotifier};
use immigration_ops::workflows::intake::CaseSession;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let session = Arc::new(Mutex::new(CaseSession::open(
        Arc::new(InMemorySessionStore::new()),
        local_now(),
        config.deadlines,
        config.documents,
    )?));
    let case_store = CaseStoreClient::from_config(&config.case_store)?;
    if !case_store.is_configured() {
        warn!("CASE_STORE_URL is not configured; case dashboard routes will return 503");
    }

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        session: session.clone(),
        case_store: Arc::new(case_store),
    };

    let ticker = ReevaluationScheduler::new(config.deadlines.tick_interval, SystemClock)
        .spawn(session, Arc::new(TracingNotifier));

    let app = router(config.documents.max_upload_bytes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "immigration ops service ready");

    let served = axum::serve(listener, app).await;
    ticker.abort();
    served?;
    Ok(())
}
