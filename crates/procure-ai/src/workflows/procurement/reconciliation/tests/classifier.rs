use super::common::*;
use crate::workflows::procurement::reconciliation::classifier::classify;
use crate::workflows::procurement::reconciliation::matcher::match_lines;
use crate::workflows::procurement::reconciliation::{
    DiscrepancyDetail, QuantityBaseline, ReconcileOptions,
};

fn classify_first(
    order: &crate::workflows::procurement::domain::PurchaseOrder,
    receipt: Option<&crate::workflows::procurement::domain::GoodsReceipt>,
    invoice: &crate::workflows::procurement::domain::Invoice,
    options: &ReconcileOptions,
) -> Vec<DiscrepancyDetail> {
    let matches = match_lines(Some(order), receipt, Some(invoice));
    classify(&matches[0], options)
}

#[test]
fn exact_match_emits_nothing() {
    let order = order();
    let receipt = receipt();
    let invoice = invoice();
    let options = ReconcileOptions::default();

    let matches = match_lines(Some(&order), Some(&receipt), Some(&invoice));
    for line in &matches {
        assert!(classify(line, &options).is_empty());
    }
}

#[test]
fn overcharge_carries_expected_actual_and_impact() {
    let order = order();
    let receipt = receipt();
    let invoice = overcharged_invoice();

    let details = classify_first(&order, Some(&receipt), &invoice, &ReconcileOptions::default());

    assert_eq!(details.len(), 1);
    match &details[0] {
        DiscrepancyDetail::Overcharge {
            expected,
            actual,
            difference,
            amount,
            ..
        } => {
            assert_eq!(*expected, dec("10.00"));
            assert_eq!(*actual, dec("12.00"));
            assert_eq!(*difference, dec("2.00"));
            assert_eq!(*amount, dec("10.00"));
        }
        other => panic!("expected overcharge, got {other:?}"),
    }
}

#[test]
fn price_tolerance_silences_small_increases() {
    let order = order();
    let receipt = receipt();
    let mut invoice = invoice();
    invoice.lines[0] = invoice_line("il-1", Some("P-100"), None, "5", "10.40", "52.00", Some("20"));

    let tolerant = ReconcileOptions {
        price_tolerance: dec("0.50"),
        ..ReconcileOptions::default()
    };
    assert!(classify_first(&order, Some(&receipt), &invoice, &tolerant).is_empty());

    let strict = ReconcileOptions::default();
    let details = classify_first(&order, Some(&receipt), &invoice, &strict);
    assert!(matches!(details[0], DiscrepancyDetail::Overcharge { .. }));
}

#[test]
fn quantity_comparison_is_exact_decimal_not_epsilon() {
    let order = order();
    let mut invoice = invoice();
    invoice.lines[0] = invoice_line(
        "il-1",
        Some("P-100"),
        None,
        "5.0000001",
        "10.00",
        "50.000001",
        Some("20"),
    );

    let details = classify_first(&order, None, &invoice, &ReconcileOptions::default());
    assert!(matches!(
        details[0],
        DiscrepancyDetail::QuantityMismatch { .. }
    ));

    let tolerant = ReconcileOptions {
        quantity_tolerance: dec("0.001"),
        ..ReconcileOptions::default()
    };
    assert!(classify_first(&order, None, &invoice, &tolerant).is_empty());
}

#[test]
fn received_quantity_is_preferred_over_ordered() {
    let order = order();
    // Warehouse only counted 4 of the 5 ordered units.
    let mut receipt = receipt();
    receipt.lines[0] = receipt_line("rl-1", "ol-1", Some("4"));
    let invoice = invoice(); // bills the ordered 5

    let details = classify_first(&order, Some(&receipt), &invoice, &ReconcileOptions::default());

    match &details[0] {
        DiscrepancyDetail::QuantityMismatch {
            expected,
            actual,
            difference,
            amount,
            receiving_line_id,
            ..
        } => {
            assert_eq!(*expected, dec("4"));
            assert_eq!(*actual, dec("5"));
            assert_eq!(*difference, dec("1"));
            assert_eq!(*amount, dec("10.00"));
            assert_eq!(
                receiving_line_id.as_ref().map(|id| id.0.as_str()),
                Some("rl-1")
            );
        }
        other => panic!("expected quantity mismatch, got {other:?}"),
    }
}

#[test]
fn ordered_baseline_ignores_receiving_counts() {
    let order = order();
    let mut receipt = receipt();
    receipt.lines[0] = receipt_line("rl-1", "ol-1", Some("4"));
    let invoice = invoice();

    let options = ReconcileOptions {
        quantity_baseline: QuantityBaseline::Ordered,
        ..ReconcileOptions::default()
    };

    assert!(classify_first(&order, Some(&receipt), &invoice, &options).is_empty());
}

#[test]
fn unrecorded_count_falls_back_to_ordered_quantity() {
    let order = order();
    let mut receipt = receipt();
    receipt.lines[0] = receipt_line("rl-1", "ol-1", None);
    let invoice = invoice();

    assert!(
        classify_first(&order, Some(&receipt), &invoice, &ReconcileOptions::default()).is_empty()
    );
}

#[test]
fn unauthorized_item_bills_the_full_line_total() {
    let order = order();
    let invoice = unauthorized_invoice();

    let matches = match_lines(Some(&order), None, Some(&invoice));
    let unmatched = matches.last().expect("unmatched line");
    let details = classify(unmatched, &ReconcileOptions::default());

    assert_eq!(details.len(), 1);
    match &details[0] {
        DiscrepancyDetail::UnauthorizedItem {
            invoice_line_id,
            amount,
        } => {
            assert_eq!(invoice_line_id.0, "il-9");
            assert_eq!(*amount, dec("45.00"));
        }
        other => panic!("expected unauthorized item, got {other:?}"),
    }
}

#[test]
fn vat_error_is_proportional_to_the_line_total() {
    let order = order();
    let receipt = receipt();
    let mut invoice = invoice();
    // Product is configured at 20%, the invoice carries 10%.
    invoice.lines[0] = invoice_line("il-1", Some("P-100"), None, "5", "10.00", "50.00", Some("10"));

    let details = classify_first(&order, Some(&receipt), &invoice, &ReconcileOptions::default());

    assert_eq!(details.len(), 1);
    match &details[0] {
        DiscrepancyDetail::VatError {
            expected,
            actual,
            difference,
            amount,
            ..
        } => {
            assert_eq!(*expected, dec("20"));
            assert_eq!(*actual, dec("10"));
            assert_eq!(*difference, dec("-10"));
            assert_eq!(*amount, dec("-5.00"));
        }
        other => panic!("expected VAT error, got {other:?}"),
    }
}

#[test]
fn missing_vat_on_either_side_skips_the_rule() {
    let mut order = order();
    order.lines[0]
        .product
        .as_mut()
        .expect("product present")
        .vat_rate = None;
    let invoice = invoice();

    assert!(classify_first(&order, None, &invoice, &ReconcileOptions::default()).is_empty());
}

#[test]
fn one_line_can_emit_several_findings() {
    let order = order();
    let mut receipt = receipt();
    receipt.lines[0] = receipt_line("rl-1", "ol-1", Some("4"));
    // Billed for 5 at an inflated price with the wrong VAT rate.
    let mut invoice = invoice();
    invoice.lines[0] = invoice_line("il-1", Some("P-100"), None, "5", "12.00", "60.00", Some("10"));

    let details = classify_first(&order, Some(&receipt), &invoice, &ReconcileOptions::default());

    let kinds: Vec<&'static str> = details.iter().map(DiscrepancyDetail::kind).collect();
    assert_eq!(kinds, ["quantity_mismatch", "overcharge", "vat_error"]);
}

#[test]
fn zero_impact_findings_are_dropped() {
    let order = order();
    // Billed quantity differs but at a zero unit price the impact is nil.
    let mut invoice = invoice();
    invoice.lines[0] = invoice_line("il-1", Some("P-100"), None, "7", "0", "0", Some("20"));

    let details = classify_first(&order, None, &invoice, &ReconcileOptions::default());
    assert!(details
        .iter()
        .all(|detail| !matches!(detail, DiscrepancyDetail::QuantityMismatch { .. })));
}
