//! Three-way match between a purchase order, its goods receipt, and a
//! supplier invoice.
//!
//! The engine is a pure function over document snapshots: the caller loads
//! the three documents inside one consistent read, and identical inputs
//! always produce an identical discrepancy list.

pub(crate) mod classifier;
mod config;
pub(crate) mod matcher;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{QuantityBaseline, ReconcileOptions};
pub use repository::{
    ReconciliationKey, ReconciliationRecord, ReconciliationRepository, ReconciliationStatusView,
    RepositoryError,
};
pub use router::reconciliation_router;
pub use service::{ReconciliationService, ReconciliationServiceError};

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{
    GoodsReceipt, Invoice, InvoiceLineId, OrderId, OrderLine, OrderLineId, PurchaseOrder,
    ReceiptId, ReceiptLineId,
};
use super::money::{self, AmountError};

/// State of a reconciliation record.
///
/// The engine only ever produces `matched` or `discrepancy`; `contested` and
/// `resolved` are set by explicit reviewer action through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    Matched,
    Discrepancy,
    Contested,
    Resolved,
}

impl ReconciliationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReconciliationStatus::Matched => "matched",
            ReconciliationStatus::Discrepancy => "discrepancy",
            ReconciliationStatus::Contested => "contested",
            ReconciliationStatus::Resolved => "resolved",
        }
    }
}

/// One quantified mismatch between what was ordered, received, and billed.
///
/// The serialized form is the `discrepancy_details` JSON array persisted with
/// each reconciliation, so the tags and field names here are a storage
/// contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DiscrepancyDetail {
    /// The invoice bills a product that never appeared on the order.
    UnauthorizedItem {
        invoice_line_id: InvoiceLineId,
        amount: Decimal,
    },
    /// Billed quantity differs from the expected quantity.
    QuantityMismatch {
        invoice_line_id: InvoiceLineId,
        order_line_id: OrderLineId,
        receiving_line_id: Option<ReceiptLineId>,
        expected: Decimal,
        actual: Decimal,
        difference: Decimal,
        amount: Decimal,
    },
    /// Billed unit price exceeds the ordered unit price beyond tolerance.
    Overcharge {
        invoice_line_id: InvoiceLineId,
        order_line_id: OrderLineId,
        receiving_line_id: Option<ReceiptLineId>,
        expected: Decimal,
        actual: Decimal,
        difference: Decimal,
        amount: Decimal,
    },
    /// Billed VAT rate differs from the rate configured on the product.
    VatError {
        invoice_line_id: InvoiceLineId,
        order_line_id: OrderLineId,
        expected: Decimal,
        actual: Decimal,
        difference: Decimal,
        amount: Decimal,
    },
}

impl DiscrepancyDetail {
    /// Signed monetary impact; overcharges positive, undercharges negative.
    pub fn amount(&self) -> Decimal {
        match self {
            DiscrepancyDetail::UnauthorizedItem { amount, .. }
            | DiscrepancyDetail::QuantityMismatch { amount, .. }
            | DiscrepancyDetail::Overcharge { amount, .. }
            | DiscrepancyDetail::VatError { amount, .. } => *amount,
        }
    }

    pub fn invoice_line_id(&self) -> &InvoiceLineId {
        match self {
            DiscrepancyDetail::UnauthorizedItem { invoice_line_id, .. }
            | DiscrepancyDetail::QuantityMismatch { invoice_line_id, .. }
            | DiscrepancyDetail::Overcharge { invoice_line_id, .. }
            | DiscrepancyDetail::VatError { invoice_line_id, .. } => invoice_line_id,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            DiscrepancyDetail::UnauthorizedItem { .. } => "unauthorized_item",
            DiscrepancyDetail::QuantityMismatch { .. } => "quantity_mismatch",
            DiscrepancyDetail::Overcharge { .. } => "overcharge",
            DiscrepancyDetail::VatError { .. } => "vat_error",
        }
    }
}

/// Aggregated result of a three-way match, before any persistence concerns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationOutcome {
    pub status: ReconciliationStatus,
    pub total_ordered: Decimal,
    pub total_received: Decimal,
    pub total_invoiced: Decimal,
    pub discrepancy_amount: Decimal,
    pub details: Vec<DiscrepancyDetail>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("reconciliation needs at least a purchase order or an invoice")]
    MissingDocuments,
    #[error("goods receipt {receipt:?} was recorded against a different order than {order:?}")]
    ForeignReceipt { receipt: ReceiptId, order: OrderId },
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Stateless engine performing the purchase order / goods receipt / invoice
/// three-way match.
pub struct ReconciliationEngine {
    options: ReconcileOptions,
}

impl ReconciliationEngine {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Compare the documents line by line and aggregate the findings.
    ///
    /// Details are collected in deterministic order: order lines in their
    /// original sequence, then unmatched invoice lines in invoice order.
    pub fn reconcile(
        &self,
        order: Option<&PurchaseOrder>,
        receipt: Option<&GoodsReceipt>,
        invoice: Option<&Invoice>,
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        if order.is_none() && invoice.is_none() {
            return Err(ReconcileError::MissingDocuments);
        }
        if let (Some(order), Some(receipt)) = (order, receipt) {
            if receipt.order_id != order.id {
                return Err(ReconcileError::ForeignReceipt {
                    receipt: receipt.id.clone(),
                    order: order.id.clone(),
                });
            }
        }
        validate_documents(order, receipt, invoice)?;

        let matches = matcher::match_lines(order, receipt, invoice);
        let mut details = Vec::new();
        for line in &matches {
            details.extend(classifier::classify(line, &self.options));
        }

        let total_ordered = order
            .map(|order| order.lines.iter().map(OrderLine::line_total).sum())
            .unwrap_or(Decimal::ZERO);
        let total_received = received_total(order, receipt);
        let total_invoiced = invoice
            .map(|invoice| invoice.lines.iter().map(|line| line.line_total).sum())
            .unwrap_or(Decimal::ZERO);
        let discrepancy_amount = details.iter().map(DiscrepancyDetail::amount).sum();

        let status = if details.is_empty() {
            ReconciliationStatus::Matched
        } else {
            ReconciliationStatus::Discrepancy
        };

        Ok(ReconciliationOutcome {
            status,
            total_ordered,
            total_received,
            total_invoiced,
            discrepancy_amount,
            details,
        })
    }
}

/// Received quantities priced at the ordered unit price.
fn received_total(order: Option<&PurchaseOrder>, receipt: Option<&GoodsReceipt>) -> Decimal {
    let (Some(order), Some(receipt)) = (order, receipt) else {
        return Decimal::ZERO;
    };

    let unit_prices: HashMap<&OrderLineId, Decimal> = order
        .lines
        .iter()
        .map(|line| (&line.id, line.unit_price))
        .collect();

    receipt
        .lines
        .iter()
        .filter_map(|line| {
            let quantity = line.quantity_received?;
            let price = unit_prices.get(&line.order_line_id)?;
            Some(quantity * *price)
        })
        .sum()
}

fn validate_documents(
    order: Option<&PurchaseOrder>,
    receipt: Option<&GoodsReceipt>,
    invoice: Option<&Invoice>,
) -> Result<(), AmountError> {
    if let Some(order) = order {
        for line in &order.lines {
            money::non_negative("order quantity", line.quantity)?;
            money::non_negative("order unit price", line.unit_price)?;
            if let Some(rate) = line.product.as_ref().and_then(|product| product.vat_rate) {
                money::non_negative("product VAT rate", rate)?;
            }
        }
    }
    if let Some(receipt) = receipt {
        for line in &receipt.lines {
            if let Some(quantity) = line.quantity_received {
                money::non_negative("received quantity", quantity)?;
            }
        }
    }
    if let Some(invoice) = invoice {
        for line in &invoice.lines {
            money::non_negative("invoice quantity", line.quantity)?;
            money::non_negative("invoice unit price", line.unit_price)?;
            money::non_negative("invoice line total", line.line_total)?;
            if let Some(rate) = line.vat_rate {
                money::non_negative("invoice VAT rate", rate)?;
            }
        }
    }
    Ok(())
}
