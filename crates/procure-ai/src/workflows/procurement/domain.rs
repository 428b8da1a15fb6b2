use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for suppliers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub String);

/// Identifier wrapper for purchase orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Identifier wrapper for purchase order lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLineId(pub String);

/// Identifier wrapper for goods receipts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(pub String);

/// Identifier wrapper for goods receipt lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptLineId(pub String);

/// Identifier wrapper for supplier invoices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

/// Identifier wrapper for supplier invoice lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceLineId(pub String);

/// Identifier wrapper for catalog products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Lifecycle of a purchase order. Orders are immutable once sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Sent,
    PartiallyReceived,
    Received,
    Closed,
    Cancelled,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Sent => "sent",
            OrderStatus::PartiallyReceived => "partially_received",
            OrderStatus::Received => "received",
            OrderStatus::Closed => "closed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Orders that completed their lifecycle without being cancelled.
    pub const fn is_fulfilled(self) -> bool {
        matches!(self, OrderStatus::Received | OrderStatus::Closed)
    }

    pub const fn is_draft(self) -> bool {
        matches!(self, OrderStatus::Draft)
    }
}

/// Product identity carried on an order line, snapshotted at ordering time.
///
/// `vat_rate` is the rate configured on the catalog product and is what an
/// invoice is expected to bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub vat_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    /// `None` for ad-hoc purchases with no catalog entry.
    pub product: Option<ProductSnapshot>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl OrderLine {
    /// Line totals are derived, never stored, so edits cannot leave them stale.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,
    pub supplier_id: SupplierId,
    pub status: OrderStatus,
    pub sent_at: Option<NaiveDate>,
    pub expected_delivery: Option<NaiveDate>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub id: ReceiptLineId,
    /// Receiving lines are always recorded against a specific order line.
    pub order_line_id: OrderLineId,
    /// `None` until the warehouse records the count.
    pub quantity_received: Option<Decimal>,
    pub is_conforming: bool,
    pub non_conformity_note: Option<String>,
}

/// Goods receipt recorded against one purchase order. Mutable while receiving
/// is underway, frozen once `received_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsReceipt {
    pub id: ReceiptId,
    pub order_id: OrderId,
    pub received_at: Option<NaiveDate>,
    pub lines: Vec<ReceiptLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub product_id: Option<ProductId>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub vat_rate: Option<Decimal>,
}

/// Supplier invoice as captured from the uploaded document. Mutable until
/// verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub supplier_id: SupplierId,
    pub lines: Vec<InvoiceLine>,
}
