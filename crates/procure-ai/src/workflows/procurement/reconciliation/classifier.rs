use rust_decimal::Decimal;

use super::config::{QuantityBaseline, ReconcileOptions};
use super::matcher::LineMatch;
use super::DiscrepancyDetail;

/// Apply the discrepancy rules to one matched line.
///
/// Rules run in a fixed order — unauthorized item, quantity, price, VAT — so
/// recomputation always yields the same list. A finding whose monetary
/// impact nets out to zero is dropped.
pub(crate) fn classify(line: &LineMatch, options: &ReconcileOptions) -> Vec<DiscrepancyDetail> {
    let mut details = Vec::new();

    // An order line nobody billed yet is informational, not a discrepancy.
    let Some(invoice) = &line.invoice else {
        return details;
    };

    let Some(order) = &line.order else {
        if !invoice.line_total.is_zero() {
            details.push(DiscrepancyDetail::UnauthorizedItem {
                invoice_line_id: invoice.line_id.clone(),
                amount: invoice.line_total,
            });
        }
        return details;
    };

    let receiving_line_id = line.receipt.as_ref().map(|facts| facts.line_id.clone());

    // The invoice should match what was physically received, not merely what
    // was ordered; the baseline option lets sites that bill against the
    // order keep the older behavior.
    let counted = line.receipt.as_ref().and_then(|facts| facts.quantity_received);
    let expected_quantity = match (options.quantity_baseline, counted) {
        (QuantityBaseline::Received, Some(counted)) => counted,
        _ => order.quantity,
    };

    let quantity_delta = invoice.quantity - expected_quantity;
    if quantity_delta.abs() > options.quantity_tolerance {
        let amount = quantity_delta * invoice.unit_price;
        if !amount.is_zero() {
            details.push(DiscrepancyDetail::QuantityMismatch {
                invoice_line_id: invoice.line_id.clone(),
                order_line_id: order.line_id.clone(),
                receiving_line_id: receiving_line_id.clone(),
                expected: expected_quantity,
                actual: invoice.quantity,
                difference: quantity_delta,
                amount,
            });
        }
    }

    // Only increases count as overcharges; billing below the agreed price is
    // not reported here.
    let price_delta = invoice.unit_price - order.unit_price;
    if price_delta > options.price_tolerance {
        let amount = price_delta * invoice.quantity;
        if !amount.is_zero() {
            details.push(DiscrepancyDetail::Overcharge {
                invoice_line_id: invoice.line_id.clone(),
                order_line_id: order.line_id.clone(),
                receiving_line_id,
                expected: order.unit_price,
                actual: invoice.unit_price,
                difference: price_delta,
                amount,
            });
        }
    }

    // VAT needs both sides: the rate configured on the ordered product and
    // the rate the invoice actually carries.
    let expected_rate = order.product.as_ref().and_then(|product| product.vat_rate);
    if let (Some(expected_rate), Some(actual_rate)) = (expected_rate, invoice.vat_rate) {
        if actual_rate != expected_rate {
            let rate_delta = actual_rate - expected_rate;
            let amount = rate_delta * invoice.line_total / Decimal::ONE_HUNDRED;
            if !amount.is_zero() {
                details.push(DiscrepancyDetail::VatError {
                    invoice_line_id: invoice.line_id.clone(),
                    order_line_id: order.line_id.clone(),
                    expected: expected_rate,
                    actual: actual_rate,
                    difference: rate_delta,
                    amount,
                });
            }
        }
    }

    details
}
