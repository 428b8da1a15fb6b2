use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::super::domain::SupplierId;
use super::history::{DateRange, SupplierHistory};
use super::{ScoringError, SupplierScoringEngine};

/// State shared by the scoring endpoints.
pub struct ScoringState<H: ?Sized> {
    pub engine: Arc<SupplierScoringEngine>,
    pub history: Arc<H>,
}

impl<H: ?Sized> Clone for ScoringState<H> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            history: self.history.clone(),
        }
    }
}

/// Router builder exposing supplier performance scores.
pub fn scoring_router<H>(engine: Arc<SupplierScoringEngine>, history: Arc<H>) -> Router
where
    H: SupplierHistory + 'static,
{
    Router::new()
        .route(
            "/api/v1/procurement/suppliers/:supplier_id/score",
            get(score_handler::<H>),
        )
        .with_state(ScoringState { engine, history })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

pub(crate) async fn score_handler<H>(
    State(state): State<ScoringState<H>>,
    Path(supplier_id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Response
where
    H: SupplierHistory + 'static,
{
    let supplier = SupplierId(supplier_id);
    let range = resolve_range(query);

    match state.engine.score(&supplier, range, state.history.as_ref()) {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(err @ ScoringError::Amount(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn resolve_range(query: ScoreQuery) -> DateRange {
    let to = query.to.unwrap_or_else(|| Utc::now().date_naive());
    match query.from {
        Some(from) => DateRange::new(from, to),
        None => DateRange::trailing_months(to, 12),
    }
}
