use std::io::Cursor;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use procure_ai::error::AppError;
use procure_ai::workflows::imports::InvoiceExtractImporter;
use procure_ai::workflows::procurement::domain::{Invoice, InvoiceId, SupplierId};
use procure_ai::workflows::procurement::reconciliation::{
    reconciliation_router, ReconciliationRepository, ReconciliationService,
};
use procure_ai::workflows::procurement::scoring::{
    scoring_router, SupplierHistory, SupplierScoringEngine,
};
use serde::Deserialize;
use serde_json::json;

use crate::infra::AppState;

/// OCR output for one uploaded invoice, pasted inline as CSV text.
#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceImportRequest {
    pub(crate) invoice_id: String,
    pub(crate) supplier_id: String,
    pub(crate) extract_csv: String,
}

pub(crate) fn with_procurement_routes<R, H>(
    reconciliation: Arc<ReconciliationService<R>>,
    scoring: Arc<SupplierScoringEngine>,
    history: Arc<H>,
) -> axum::Router
where
    R: ReconciliationRepository + 'static,
    H: SupplierHistory + 'static,
{
    reconciliation_router(reconciliation)
        .merge(scoring_router(scoring, history))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/procurement/invoices/import",
            axum::routing::post(invoice_import_endpoint),
        )
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

pub(crate) async fn invoice_import_endpoint(
    Json(payload): Json<InvoiceImportRequest>,
) -> Result<Json<Invoice>, AppError> {
    let InvoiceImportRequest {
        invoice_id,
        supplier_id,
        extract_csv,
    } = payload;

    let reader = Cursor::new(extract_csv.into_bytes());
    let invoice = InvoiceExtractImporter::from_reader(
        reader,
        InvoiceId(invoice_id),
        SupplierId(supplier_id),
    )?;

    Ok(Json(invoice))
}
