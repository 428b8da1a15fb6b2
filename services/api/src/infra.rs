use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use procure_ai::config::AppConfig;
use procure_ai::workflows::procurement::domain::{
    GoodsReceipt, InvoiceId, ProductId, PurchaseOrder, SupplierId,
};
use procure_ai::workflows::procurement::reconciliation::{
    ReconcileOptions, ReconciliationKey, ReconciliationRecord, ReconciliationRepository,
    RepositoryError,
};
use procure_ai::workflows::procurement::scoring::{
    DateRange, HistoryError, PeerPrice, ProductPrice, SupplierHistory,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReconciliationRepository {
    records: Arc<Mutex<HashMap<ReconciliationKey, ReconciliationRecord>>>,
}

impl ReconciliationRepository for InMemoryReconciliationRepository {
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

/// Document history backing the scoring endpoints until the ERP read side is
/// wired in; served from seeded in-memory rows.
#[derive(Default, Clone)]
pub(crate) struct InMemorySupplierHistory {
    pub(crate) orders: Vec<PurchaseOrder>,
    pub(crate) receipts: Vec<GoodsReceipt>,
    pub(crate) catalogs: HashMap<SupplierId, Vec<ProductPrice>>,
    pub(crate) peers: HashMap<ProductId, Vec<PeerPrice>>,
}

impl SupplierHistory for InMemorySupplierHistory {
    fn orders(
        &self,
        supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<PurchaseOrder>, HistoryError> {
        Ok(self
            .orders
            .iter()
            .filter(|order| &order.supplier_id == supplier)
            .filter(|order| order.sent_at.map(|sent| range.contains(sent)).unwrap_or(true))
            .cloned()
            .collect())
    }

    fn receipts(
        &self,
        supplier: &SupplierId,
        range: &DateRange,
    ) -> Result<Vec<GoodsReceipt>, HistoryError> {
        let order_ids: Vec<_> = self
            .orders
            .iter()
            .filter(|order| &order.supplier_id == supplier)
            .map(|order| order.id.clone())
            .collect();
        Ok(self
            .receipts
            .iter()
            .filter(|receipt| order_ids.contains(&receipt.order_id))
            .filter(|receipt| {
                receipt
                    .received_at
                    .map(|received| range.contains(received))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn catalog_prices(&self, supplier: &SupplierId) -> Result<Vec<ProductPrice>, HistoryError> {
        Ok(self.catalogs.get(supplier).cloned().unwrap_or_default())
    }

    fn peer_prices(&self, product: &ProductId) -> Result<Vec<PeerPrice>, HistoryError> {
        Ok(self.peers.get(product).cloned().unwrap_or_default())
    }
}

pub(crate) fn default_reconcile_options(config: &AppConfig) -> ReconcileOptions {
    ReconcileOptions {
        price_tolerance: config.reconciliation.price_tolerance,
        quantity_tolerance: config.reconciliation.quantity_tolerance,
        ..ReconcileOptions::default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
