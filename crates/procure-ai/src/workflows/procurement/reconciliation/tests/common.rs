use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::workflows::procurement::domain::{
    GoodsReceipt, Invoice, InvoiceId, InvoiceLine, InvoiceLineId, OrderId, OrderLine, OrderLineId,
    OrderStatus, ProductId, ProductSnapshot, PurchaseOrder, ReceiptId, ReceiptLine, ReceiptLineId,
    SupplierId,
};
use crate::workflows::procurement::reconciliation::repository::{
    ReconciliationKey, ReconciliationRecord, ReconciliationRepository, RepositoryError,
};
use crate::workflows::procurement::reconciliation::{
    ReconcileOptions, ReconciliationEngine, ReconciliationService,
};

pub(super) fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub(super) fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date literal")
}

pub(super) fn product(id: &str, name: &str, vat_rate: Option<&str>) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        vat_rate: vat_rate.map(dec),
    }
}

pub(super) fn order_line(
    id: &str,
    product: Option<ProductSnapshot>,
    quantity: &str,
    unit_price: &str,
) -> OrderLine {
    OrderLine {
        id: OrderLineId(id.to_string()),
        product,
        description: None,
        quantity: dec(quantity),
        unit_price: dec(unit_price),
    }
}

/// Two-line order: 5 x copper tubing at 10.00, 2 x junction box at 4.50.
pub(super) fn order() -> PurchaseOrder {
    PurchaseOrder {
        id: OrderId("po-1001".to_string()),
        supplier_id: SupplierId("sup-1".to_string()),
        status: OrderStatus::Received,
        sent_at: Some(date("2025-03-01")),
        expected_delivery: Some(date("2025-03-08")),
        lines: vec![
            order_line(
                "ol-1",
                Some(product("P-100", "Copper tubing", Some("20"))),
                "5",
                "10.00",
            ),
            order_line(
                "ol-2",
                Some(product("P-200", "Junction box", Some("20"))),
                "2",
                "4.50",
            ),
        ],
    }
}

pub(super) fn receipt_line(id: &str, order_line: &str, quantity: Option<&str>) -> ReceiptLine {
    ReceiptLine {
        id: ReceiptLineId(id.to_string()),
        order_line_id: OrderLineId(order_line.to_string()),
        quantity_received: quantity.map(dec),
        is_conforming: true,
        non_conformity_note: None,
    }
}

/// Full, conforming receipt for [`order`].
pub(super) fn receipt() -> GoodsReceipt {
    GoodsReceipt {
        id: ReceiptId("gr-501".to_string()),
        order_id: OrderId("po-1001".to_string()),
        received_at: Some(date("2025-03-07")),
        lines: vec![
            receipt_line("rl-1", "ol-1", Some("5")),
            receipt_line("rl-2", "ol-2", Some("2")),
        ],
    }
}

pub(super) fn invoice_line(
    id: &str,
    product: Option<&str>,
    description: Option<&str>,
    quantity: &str,
    unit_price: &str,
    line_total: &str,
    vat_rate: Option<&str>,
) -> InvoiceLine {
    InvoiceLine {
        id: InvoiceLineId(id.to_string()),
        product_id: product.map(|p| ProductId(p.to_string())),
        description: description.map(str::to_string),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        line_total: dec(line_total),
        vat_rate: vat_rate.map(dec),
    }
}

/// Invoice matching [`order`] exactly on quantity, price, and VAT.
pub(super) fn invoice() -> Invoice {
    Invoice {
        id: InvoiceId("inv-9001".to_string()),
        supplier_id: SupplierId("sup-1".to_string()),
        lines: vec![
            invoice_line("il-1", Some("P-100"), None, "5", "10.00", "50.00", Some("20")),
            invoice_line("il-2", Some("P-200"), None, "2", "4.50", "9.00", Some("20")),
        ],
    }
}

/// Same invoice with the copper tubing billed at 12.00 instead of 10.00.
pub(super) fn overcharged_invoice() -> Invoice {
    let mut invoice = invoice();
    invoice.lines[0] =
        invoice_line("il-1", Some("P-100"), None, "5", "12.00", "60.00", Some("20"));
    invoice
}

/// Single line for a product the order never carried; line total 45.00.
pub(super) fn unauthorized_invoice() -> Invoice {
    Invoice {
        id: InvoiceId("inv-9002".to_string()),
        supplier_id: SupplierId("sup-1".to_string()),
        lines: vec![invoice_line(
            "il-9",
            Some("Q-900"),
            Some("Sealant"),
            "3",
            "15.00",
            "45.00",
            Some("20"),
        )],
    }
}

pub(super) fn engine() -> ReconciliationEngine {
    ReconciliationEngine::new(ReconcileOptions::default())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ReconciliationKey, ReconciliationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ReconciliationRepository for MemoryRepository {
    fn upsert(
        &self,
        record: ReconciliationRecord,
    ) -> Result<ReconciliationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.key(), record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        key: &ReconciliationKey,
    ) -> Result<Option<ReconciliationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn for_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<ReconciliationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.invoice_id == invoice_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl ReconciliationRepository for UnavailableRepository {
    fn upsert(
        &self,
        _record: ReconciliationRecord,
    ) -> Result<ReconciliationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _key: &ReconciliationKey,
    ) -> Result<Option<ReconciliationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_invoice(
        &self,
        _invoice_id: &InvoiceId,
    ) -> Result<Vec<ReconciliationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ReconciliationService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ReconciliationService::new(repository.clone(), ReconcileOptions::default());
    (service, repository)
}
