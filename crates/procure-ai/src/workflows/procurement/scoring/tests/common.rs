use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::workflows::procurement::domain::{
    GoodsReceipt, OrderId, OrderStatus, ProductId, PurchaseOrder, ReceiptId, ReceiptLine,
    ReceiptLineId, SupplierId,
};
use crate::workflows::procurement::scoring::{
    DateRange, HistoryError, PeerPrice, ProductPrice, ScoringConfig, SupplierHistory,
    SupplierScoringEngine,
};

pub(super) fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub(super) fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date literal")
}

pub(super) fn supplier() -> SupplierId {
    SupplierId("sup-1".to_string())
}

pub(super) fn range() -> DateRange {
    DateRange::new(date("2025-01-01"), date("2025-12-31"))
}

pub(super) fn engine() -> SupplierScoringEngine {
    SupplierScoringEngine::new(ScoringConfig::default())
}

/// Order with an explicit delivery deadline, no lines (scoring never needs
/// them).
pub(super) fn order_due(id: &str, status: OrderStatus, expected: &str) -> PurchaseOrder {
    PurchaseOrder {
        id: OrderId(id.to_string()),
        supplier_id: supplier(),
        status,
        sent_at: Some(date("2025-02-01")),
        expected_delivery: Some(date(expected)),
        lines: Vec::new(),
    }
}

/// Order with no expected date; punctuality falls back to sent + grace.
pub(super) fn order_sent(id: &str, sent: &str) -> PurchaseOrder {
    PurchaseOrder {
        id: OrderId(id.to_string()),
        supplier_id: supplier(),
        status: OrderStatus::Received,
        sent_at: Some(date(sent)),
        expected_delivery: None,
        lines: Vec::new(),
    }
}

pub(super) fn receipt_on(id: &str, order_id: &str, received: &str) -> GoodsReceipt {
    GoodsReceipt {
        id: ReceiptId(id.to_string()),
        order_id: OrderId(order_id.to_string()),
        received_at: Some(date(received)),
        lines: Vec::new(),
    }
}

pub(super) fn conformity_line(id: &str, conforming: bool) -> ReceiptLine {
    ReceiptLine {
        id: ReceiptLineId(id.to_string()),
        order_line_id: crate::workflows::procurement::domain::OrderLineId(format!("ol-{id}")),
        quantity_received: Some(dec("1")),
        is_conforming: conforming,
        non_conformity_note: (!conforming).then(|| "damaged packaging".to_string()),
    }
}

/// Fixture history: plain vectors filtered by the requested range, the way
/// the read side would filter rows.
#[derive(Default)]
pub(super) struct FixtureHistory {
    pub(super) orders: Vec<PurchaseOrder>,
    pub(super) receipts: Vec<GoodsReceipt>,
    pub(super) catalog: Vec<ProductPrice>,
    pub(super) peers: HashMap<ProductId, Vec<PeerPrice>>,
}

impl SupplierHistory for FixtureHistory {
    fn orders(
        &self,
        supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<PurchaseOrder>, HistoryError> {
        Ok(self
            .orders
            .iter()
            .filter(|order| &order.supplier_id == supplier)
            .filter(|order| {
                order
                    .sent_at
                    .map(|sent| range.contains(sent))
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    fn receipts(
        &self,
        _supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<GoodsReceipt>, HistoryError> {
        Ok(self
            .receipts
            .iter()
            .filter(|receipt| {
                receipt
                    .received_at
                    .map(|received| range.contains(received))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn catalog_prices(&self, _supplier: &SupplierId) -> Result<Vec<ProductPrice>, HistoryError> {
        Ok(self.catalog.clone())
    }

    fn peer_prices(&self, product: &ProductId) -> Result<Vec<PeerPrice>, HistoryError> {
        Ok(self.peers.get(product).cloned().unwrap_or_default())
    }
}

pub(super) fn peer(supplier_id: &str, price: &str) -> PeerPrice {
    PeerPrice {
        supplier_id: SupplierId(supplier_id.to_string()),
        price: dec(price),
    }
}

pub(super) fn product_price(product: &str, price: &str) -> ProductPrice {
    ProductPrice {
        product_id: ProductId(product.to_string()),
        price: dec(price),
    }
}
