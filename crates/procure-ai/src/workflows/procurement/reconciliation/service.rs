use std::sync::Arc;

use chrono::Utc;

use super::super::domain::{GoodsReceipt, Invoice, InvoiceId, PurchaseOrder};
use super::repository::{
    ReconciliationKey, ReconciliationRecord, ReconciliationRepository, RepositoryError,
};
use super::{
    ReconcileError, ReconcileOptions, ReconciliationEngine, ReconciliationOutcome,
    ReconciliationStatus,
};

/// Service composing the matching engine with the persistence boundary.
pub struct ReconciliationService<R> {
    repository: Arc<R>,
    engine: ReconciliationEngine,
}

impl<R> ReconciliationService<R>
where
    R: ReconciliationRepository + 'static,
{
    pub fn new(repository: Arc<R>, options: ReconcileOptions) -> Self {
        Self {
            repository,
            engine: ReconciliationEngine::new(options),
        }
    }

    /// Run the three-way match for an invoice and persist the result.
    ///
    /// The record for a given triple is recomputed in place, never appended.
    /// `contested` and `resolved` survive recomputation as long as the
    /// discrepancy list is unchanged; a changed list reopens the record.
    pub fn reconcile_invoice(
        &self,
        order: Option<&PurchaseOrder>,
        receipt: Option<&GoodsReceipt>,
        invoice: &Invoice,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        self.run(&self.engine, order, receipt, invoice)
    }

    /// Same as [`reconcile_invoice`](Self::reconcile_invoice) with caller
    /// tolerances overriding the service defaults for this call only.
    pub fn reconcile_invoice_with(
        &self,
        order: Option<&PurchaseOrder>,
        receipt: Option<&GoodsReceipt>,
        invoice: &Invoice,
        options: ReconcileOptions,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        self.run(&ReconciliationEngine::new(options), order, receipt, invoice)
    }

    fn run(
        &self,
        engine: &ReconciliationEngine,
        order: Option<&PurchaseOrder>,
        receipt: Option<&GoodsReceipt>,
        invoice: &Invoice,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        let outcome = engine.reconcile(order, receipt, Some(invoice))?;
        let key = ReconciliationKey {
            invoice_id: invoice.id.clone(),
            order_id: order.map(|order| order.id.clone()),
            receipt_id: receipt.map(|receipt| receipt.id.clone()),
        };
        let existing = self.repository.fetch(&key)?;
        let record = merge_outcome(key, outcome, existing);
        let stored = self.repository.upsert(record)?;
        Ok(stored)
    }

    pub fn get(
        &self,
        key: &ReconciliationKey,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        let record = self.repository.fetch(key)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn for_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<ReconciliationRecord>, ReconciliationServiceError> {
        Ok(self.repository.for_invoice(invoice_id)?)
    }

    /// Record a reviewer's resolution of the open discrepancies.
    pub fn resolve(
        &self,
        key: &ReconciliationKey,
        resolver: &str,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        let mut record = self.repository.fetch(key)?.ok_or(RepositoryError::NotFound)?;
        match record.status {
            ReconciliationStatus::Discrepancy | ReconciliationStatus::Contested => {
                record.status = ReconciliationStatus::Resolved;
                record.resolved_by = Some(resolver.to_string());
                record.resolved_at = Some(Utc::now());
                Ok(self.repository.upsert(record)?)
            }
            other => Err(ReconciliationServiceError::InvalidTransition {
                status: other.label(),
                requested: "resolved",
            }),
        }
    }

    /// Flag the discrepancies as disputed with the supplier.
    pub fn contest(
        &self,
        key: &ReconciliationKey,
    ) -> Result<ReconciliationRecord, ReconciliationServiceError> {
        let mut record = self.repository.fetch(key)?.ok_or(RepositoryError::NotFound)?;
        match record.status {
            ReconciliationStatus::Discrepancy => {
                record.status = ReconciliationStatus::Contested;
                Ok(self.repository.upsert(record)?)
            }
            other => Err(ReconciliationServiceError::InvalidTransition {
                status: other.label(),
                requested: "contested",
            }),
        }
    }
}

fn merge_outcome(
    key: ReconciliationKey,
    outcome: ReconciliationOutcome,
    existing: Option<ReconciliationRecord>,
) -> ReconciliationRecord {
    let (status, resolved_by, resolved_at) = match existing {
        Some(previous)
            if matches!(
                previous.status,
                ReconciliationStatus::Contested | ReconciliationStatus::Resolved
            ) && previous.discrepancy_details == outcome.details =>
        {
            (previous.status, previous.resolved_by, previous.resolved_at)
        }
        _ => (outcome.status, None, None),
    };

    ReconciliationRecord {
        invoice_id: key.invoice_id,
        order_id: key.order_id,
        receipt_id: key.receipt_id,
        status,
        total_ordered: outcome.total_ordered,
        total_received: outcome.total_received,
        total_invoiced: outcome.total_invoiced,
        discrepancy_amount: outcome.discrepancy_amount,
        discrepancy_details: outcome.details,
        resolved_by,
        resolved_at,
        calculated_at: Utc::now(),
    }
}

/// Error raised by the reconciliation service.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationServiceError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("reconciliation is {status} and cannot be marked {requested}")]
    InvalidTransition {
        status: &'static str,
        requested: &'static str,
    },
}
