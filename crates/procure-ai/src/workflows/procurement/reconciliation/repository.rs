use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{InvoiceId, OrderId, ReceiptId};
use super::{DiscrepancyDetail, ReconciliationStatus};

/// Identity of a reconciliation: one record per invoice x order x receipt
/// triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReconciliationKey {
    pub invoice_id: InvoiceId,
    pub order_id: Option<OrderId>,
    pub receipt_id: Option<ReceiptId>,
}

/// Persisted result of matching one invoice against an order/receipt pair.
///
/// Recomputed in place whenever a source document changes; `calculated_at`
/// is bookkeeping and takes no part in change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub invoice_id: InvoiceId,
    pub order_id: Option<OrderId>,
    pub receipt_id: Option<ReceiptId>,
    pub status: ReconciliationStatus,
    pub total_ordered: Decimal,
    pub total_received: Decimal,
    pub total_invoiced: Decimal,
    pub discrepancy_amount: Decimal,
    pub discrepancy_details: Vec<DiscrepancyDetail>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub calculated_at: DateTime<Utc>,
}

impl ReconciliationRecord {
    pub fn key(&self) -> ReconciliationKey {
        ReconciliationKey {
            invoice_id: self.invoice_id.clone(),
            order_id: self.order_id.clone(),
            receipt_id: self.receipt_id.clone(),
        }
    }

    pub fn status_view(&self) -> ReconciliationStatusView {
        ReconciliationStatusView {
            invoice_id: self.invoice_id.clone(),
            status: self.status.label(),
            discrepancy_amount: self.discrepancy_amount,
            discrepancy_count: self.discrepancy_details.len(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations must keep writes single-flight per key (unique constraint
/// or optimistic version check) and surface lost races as `Conflict`.
pub trait ReconciliationRepository: Send + Sync {
    fn upsert(&self, record: ReconciliationRecord)
        -> Result<ReconciliationRecord, RepositoryError>;
    fn fetch(&self, key: &ReconciliationKey)
        -> Result<Option<ReconciliationRecord>, RepositoryError>;
    fn for_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<ReconciliationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("concurrent write detected for this reconciliation")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Compact representation of a reconciliation's state for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationStatusView {
    pub invoice_id: InvoiceId,
    pub status: &'static str,
    pub discrepancy_amount: Decimal,
    pub discrepancy_count: usize,
}
