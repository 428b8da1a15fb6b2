use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{GoodsReceipt, ProductId, PurchaseOrder, SupplierId};

/// Closed date window a score is computed over.
///
/// Always caller-supplied; [`DateRange::trailing_months`] gives the
/// conventional twelve-month default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn trailing_months(end: NaiveDate, months: u32) -> Self {
        Self {
            from: end - chrono::Months::new(months),
            to: end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Current catalog price one supplier charges for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub product_id: ProductId,
    pub price: Decimal,
}

/// A supplier's current price for a product, as seen across the catalog.
/// Peer listings include the scored supplier's own entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerPrice {
    pub supplier_id: SupplierId,
    pub price: Decimal,
}

/// Read-side access to a supplier's document history, injected so scoring
/// performs no I/O and can run against fixtures.
pub trait SupplierHistory: Send + Sync {
    /// Non-draft orders the supplier received within the range.
    fn orders(
        &self,
        supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<PurchaseOrder>, HistoryError>;

    /// Completed goods receipts for the supplier's orders within the range.
    fn receipts(
        &self,
        supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<GoodsReceipt>, HistoryError>;

    /// The supplier's current catalog.
    fn catalog_prices(&self, supplier: &SupplierId) -> Result<Vec<ProductPrice>, HistoryError>;

    /// Every supplier currently offering the product, the scored one included.
    fn peer_prices(&self, product: &ProductId) -> Result<Vec<PeerPrice>, HistoryError>;
}

/// Error enumeration for history lookups.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history source unavailable: {0}")]
    Unavailable(String),
}
