use crate::cli::ServeArgs;
use crate::demo::seed_history;
use crate::infra::{default_reconcile_options, AppState, InMemoryReconciliationRepository};
use crate::routes::with_procurement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use procure_ai::config::AppConfig;
use procure_ai::error::AppError;
use procure_ai::telemetry;
use procure_ai::workflows::procurement::reconciliation::ReconciliationService;
use procure_ai::workflows::procurement::scoring::{ScoringConfig, SupplierScoringEngine};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryReconciliationRepository::default());
    let reconciliation = Arc::new(ReconciliationService::new(
        repository,
        default_reconcile_options(&config),
    ));
    let scoring = Arc::new(SupplierScoringEngine::new(ScoringConfig::default()));
    let history = Arc::new(seed_history());

    let app = with_procurement_routes(reconciliation, scoring, history)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "procurement orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
