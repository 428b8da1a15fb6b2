use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::domain::{GoodsReceipt, Invoice, InvoiceId, PurchaseOrder};
use super::repository::{ReconciliationKey, ReconciliationRepository, RepositoryError};
use super::service::{ReconciliationService, ReconciliationServiceError};
use super::{ReconcileError, ReconcileOptions};

/// Router builder exposing HTTP endpoints for the three-way match.
pub fn reconciliation_router<R>(service: Arc<ReconciliationService<R>>) -> Router
where
    R: ReconciliationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/procurement/reconciliations",
            post(reconcile_handler::<R>),
        )
        .route(
            "/api/v1/procurement/reconciliations/resolve",
            post(resolve_handler::<R>),
        )
        .route(
            "/api/v1/procurement/invoices/:invoice_id/reconciliations",
            get(invoice_handler::<R>),
        )
        .with_state(service)
}

/// The caller supplies all three documents as one consistent snapshot; the
/// service never fetches anything on its own.
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub order: Option<PurchaseOrder>,
    #[serde(default)]
    pub receipt: Option<GoodsReceipt>,
    pub invoice: Invoice,
    #[serde(default)]
    pub options: Option<ReconcileOptions>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub key: ReconciliationKey,
    pub resolver: String,
}

pub(crate) async fn reconcile_handler<R>(
    State(service): State<Arc<ReconciliationService<R>>>,
    axum::Json(request): axum::Json<ReconcileRequest>,
) -> Response
where
    R: ReconciliationRepository + 'static,
{
    let result = match request.options {
        Some(options) => service.reconcile_invoice_with(
            request.order.as_ref(),
            request.receipt.as_ref(),
            &request.invoice,
            options,
        ),
        None => service.reconcile_invoice(
            request.order.as_ref(),
            request.receipt.as_ref(),
            &request.invoice,
        ),
    };

    match result {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn resolve_handler<R>(
    State(service): State<Arc<ReconciliationService<R>>>,
    axum::Json(request): axum::Json<ResolveRequest>,
) -> Response
where
    R: ReconciliationRepository + 'static,
{
    match service.resolve(&request.key, &request.resolver) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn invoice_handler<R>(
    State(service): State<Arc<ReconciliationService<R>>>,
    Path(invoice_id): Path<String>,
) -> Response
where
    R: ReconciliationRepository + 'static,
{
    match service.for_invoice(&InvoiceId(invoice_id)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ReconciliationServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    let status = match &err {
        ReconciliationServiceError::Reconcile(
            ReconcileError::MissingDocuments | ReconcileError::ForeignReceipt { .. },
        )
        | ReconciliationServiceError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ReconciliationServiceError::Reconcile(ReconcileError::Amount(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReconciliationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReconciliationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReconciliationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, axum::Json(payload)).into_response()
}
