use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;

use super::super::domain::{
    GoodsReceipt, Invoice, InvoiceLine, InvoiceLineId, OrderLineId, ProductId, ProductSnapshot,
    PurchaseOrder, ReceiptLineId,
};

/// One slot of the three-way match: up to one column of facts per document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineMatch {
    pub(crate) order: Option<OrderFacts>,
    pub(crate) receipt: Option<ReceiptFacts>,
    pub(crate) invoice: Option<InvoiceFacts>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderFacts {
    pub(crate) line_id: OrderLineId,
    pub(crate) product: Option<ProductSnapshot>,
    pub(crate) quantity: Decimal,
    pub(crate) unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReceiptFacts {
    pub(crate) line_id: ReceiptLineId,
    pub(crate) quantity_received: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InvoiceFacts {
    pub(crate) line_id: InvoiceLineId,
    pub(crate) quantity: Decimal,
    pub(crate) unit_price: Decimal,
    pub(crate) line_total: Decimal,
    pub(crate) vat_rate: Option<Decimal>,
}

impl InvoiceFacts {
    fn from_line(line: &InvoiceLine) -> Self {
        Self {
            line_id: line.id.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
            vat_rate: line.vat_rate,
        }
    }

    /// Fold another billed line for the same product into this one. The
    /// effective unit price is re-derived from the summed total so the merge
    /// stays internally consistent.
    fn absorb(&mut self, line: &InvoiceLine) {
        self.quantity += line.quantity;
        self.line_total += line.line_total;
        if !self.quantity.is_zero() {
            self.unit_price = self.line_total / self.quantity;
        }
        if self.vat_rate.is_none() {
            self.vat_rate = line.vat_rate;
        }
    }
}

/// Pair order lines, receiving lines, and invoice lines by product identity.
///
/// Order lines come out in their original sequence; invoice lines that match
/// no order line follow, in invoice order, with no order or receipt facts
/// attached. Inputs are assumed validated.
pub(crate) fn match_lines(
    order: Option<&PurchaseOrder>,
    receipt: Option<&GoodsReceipt>,
    invoice: Option<&Invoice>,
) -> Vec<LineMatch> {
    let order_lines = order.map(|order| order.lines.as_slice()).unwrap_or_default();

    // Receiving lines are keyed by the order line they were recorded against.
    // More than one per order line is a data-integrity finding, not a fatal
    // error: log it and sum the counted quantities.
    let mut received: HashMap<OrderLineId, ReceiptFacts> = HashMap::new();
    if let Some(receipt) = receipt {
        for line in &receipt.lines {
            match received.entry(line.order_line_id.clone()) {
                Entry::Occupied(mut slot) => {
                    warn!(
                        receipt = %receipt.id.0,
                        order_line = %line.order_line_id.0,
                        "multiple receiving lines recorded against one order line; summing quantities"
                    );
                    let facts = slot.get_mut();
                    facts.quantity_received =
                        match (facts.quantity_received, line.quantity_received) {
                            (Some(a), Some(b)) => Some(a + b),
                            (a, b) => a.or(b),
                        };
                }
                Entry::Vacant(slot) => {
                    slot.insert(ReceiptFacts {
                        line_id: line.id.clone(),
                        quantity_received: line.quantity_received,
                    });
                }
            }
        }
    }

    let ordered_products: HashSet<&ProductId> = order_lines
        .iter()
        .filter_map(|line| line.product.as_ref())
        .map(|product| &product.id)
        .collect();
    let product_names: HashMap<String, &ProductId> = order_lines
        .iter()
        .filter_map(|line| line.product.as_ref())
        .map(|product| (product.name.trim().to_lowercase(), &product.id))
        .collect();

    // Invoice lines resolve through the product reference, with one exact
    // (case-insensitive) description-to-product-name fallback. Anything still
    // unresolved, or resolving to a product the order never carried, stays
    // unmatched; guessing a pairing is worse than reporting none.
    let mut billed: HashMap<ProductId, InvoiceFacts> = HashMap::new();
    let mut unmatched: Vec<InvoiceFacts> = Vec::new();
    if let Some(invoice) = invoice {
        for line in &invoice.lines {
            let resolved = line.product_id.clone().or_else(|| {
                let by_name = line
                    .description
                    .as_deref()
                    .and_then(|description| product_names.get(&description.trim().to_lowercase()))
                    .map(|id| (*id).clone());
                if by_name.is_none() {
                    warn!(
                        invoice = %invoice.id.0,
                        invoice_line = %line.id.0,
                        "invoice line has no product reference and no matching product name; leaving unmatched"
                    );
                }
                by_name
            });

            match resolved {
                Some(product_id) if ordered_products.contains(&product_id) => {
                    match billed.entry(product_id) {
                        Entry::Occupied(mut slot) => slot.get_mut().absorb(line),
                        Entry::Vacant(slot) => {
                            slot.insert(InvoiceFacts::from_line(line));
                        }
                    }
                }
                _ => unmatched.push(InvoiceFacts::from_line(line)),
            }
        }
    }

    let mut matches = Vec::with_capacity(order_lines.len() + unmatched.len());
    for line in order_lines {
        let invoice_facts = line
            .product
            .as_ref()
            .and_then(|product| billed.remove(&product.id));
        matches.push(LineMatch {
            order: Some(OrderFacts {
                line_id: line.id.clone(),
                product: line.product.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            }),
            receipt: received.remove(&line.id),
            invoice: invoice_facts,
        });
    }

    if !received.is_empty() {
        warn!(
            stray_lines = received.len(),
            "receiving lines reference order lines absent from the order; ignored"
        );
    }

    for facts in unmatched {
        matches.push(LineMatch {
            order: None,
            receipt: None,
            invoice: Some(facts),
        });
    }

    matches
}
