use super::common::*;
use crate::workflows::procurement::money::AmountError;
use crate::workflows::procurement::reconciliation::{
    DiscrepancyDetail, ReconcileError, ReconciliationStatus,
};

#[test]
fn clean_three_way_match_reports_matched() {
    let outcome = engine()
        .reconcile(Some(&order()), Some(&receipt()), Some(&invoice()))
        .expect("reconciles");

    assert_eq!(outcome.status, ReconciliationStatus::Matched);
    assert!(outcome.details.is_empty());
    assert_eq!(outcome.total_ordered, dec("59.00"));
    assert_eq!(outcome.total_received, dec("59.00"));
    assert_eq!(outcome.total_invoiced, dec("59.00"));
    assert_eq!(outcome.discrepancy_amount, dec("0"));
}

#[test]
fn overcharged_invoice_reports_one_discrepancy() {
    let outcome = engine()
        .reconcile(Some(&order()), Some(&receipt()), Some(&overcharged_invoice()))
        .expect("reconciles");

    assert_eq!(outcome.status, ReconciliationStatus::Discrepancy);
    assert_eq!(outcome.details.len(), 1);
    assert_eq!(outcome.discrepancy_amount, dec("10.00"));
    match &outcome.details[0] {
        DiscrepancyDetail::Overcharge {
            expected, actual, amount, ..
        } => {
            assert_eq!(*expected, dec("10.00"));
            assert_eq!(*actual, dec("12.00"));
            assert_eq!(*amount, dec("10.00"));
        }
        other => panic!("expected overcharge, got {other:?}"),
    }
}

#[test]
fn unbacked_invoice_line_reports_unauthorized_item() {
    let outcome = engine()
        .reconcile(Some(&order()), None, Some(&unauthorized_invoice()))
        .expect("reconciles");

    assert_eq!(outcome.status, ReconciliationStatus::Discrepancy);
    assert_eq!(outcome.details.len(), 1);
    match &outcome.details[0] {
        DiscrepancyDetail::UnauthorizedItem { amount, .. } => {
            assert_eq!(*amount, dec("45.00"));
        }
        other => panic!("expected unauthorized item, got {other:?}"),
    }
    assert_eq!(outcome.discrepancy_amount, dec("45.00"));
}

#[test]
fn reconcile_is_idempotent_for_fixed_inputs() {
    let order = order();
    let receipt = receipt();
    let invoice = overcharged_invoice();
    let engine = engine();

    let first = engine
        .reconcile(Some(&order), Some(&receipt), Some(&invoice))
        .expect("first run");
    let second = engine
        .reconcile(Some(&order), Some(&receipt), Some(&invoice))
        .expect("second run");

    assert_eq!(first, second);
}

#[test]
fn discrepancy_amount_equals_the_sum_of_detail_amounts() {
    let mut invoice = overcharged_invoice();
    // Undercharge the second line so positive and negative impacts mix.
    invoice.lines[1] = invoice_line("il-2", Some("P-200"), None, "1", "4.50", "4.50", Some("20"));

    let outcome = engine()
        .reconcile(Some(&order()), Some(&receipt()), Some(&invoice))
        .expect("reconciles");

    let summed: rust_decimal::Decimal =
        outcome.details.iter().map(DiscrepancyDetail::amount).sum();
    assert_eq!(outcome.discrepancy_amount, summed);
    // 10.00 overcharge minus one 4.50 unit short.
    assert_eq!(outcome.discrepancy_amount, dec("5.50"));
}

#[test]
fn status_is_matched_exactly_when_details_are_empty() {
    let engine = engine();

    let clean = engine
        .reconcile(Some(&order()), Some(&receipt()), Some(&invoice()))
        .expect("clean run");
    assert_eq!(clean.details.is_empty(), clean.status == ReconciliationStatus::Matched);
    assert_eq!(clean.status, ReconciliationStatus::Matched);

    let dirty = engine
        .reconcile(Some(&order()), Some(&receipt()), Some(&overcharged_invoice()))
        .expect("dirty run");
    assert_eq!(dirty.details.is_empty(), dirty.status == ReconciliationStatus::Matched);
    assert_eq!(dirty.status, ReconciliationStatus::Discrepancy);
}

#[test]
fn details_keep_order_line_sequence_then_unmatched_lines() {
    let mut invoice = overcharged_invoice();
    invoice
        .lines
        .push(unauthorized_invoice().lines[0].clone());

    let outcome = engine()
        .reconcile(Some(&order()), Some(&receipt()), Some(&invoice))
        .expect("reconciles");

    let kinds: Vec<&'static str> = outcome.details.iter().map(DiscrepancyDetail::kind).collect();
    assert_eq!(kinds, ["overcharge", "unauthorized_item"]);
}

#[test]
fn order_without_invoice_is_informational_only() {
    let outcome = engine()
        .reconcile(Some(&order()), Some(&receipt()), None)
        .expect("reconciles");

    assert_eq!(outcome.status, ReconciliationStatus::Matched);
    assert_eq!(outcome.total_invoiced, dec("0"));
}

#[test]
fn missing_both_order_and_invoice_is_rejected() {
    let error = engine()
        .reconcile(None, None, None)
        .expect_err("nothing to reconcile");
    assert!(matches!(error, ReconcileError::MissingDocuments));

    let error = engine()
        .reconcile(None, Some(&receipt()), None)
        .expect_err("a receipt alone is not reconcilable");
    assert!(matches!(error, ReconcileError::MissingDocuments));
}

#[test]
fn receipt_for_another_order_is_rejected() {
    let mut stray = receipt();
    stray.order_id = crate::workflows::procurement::domain::OrderId("po-9999".to_string());

    let error = engine()
        .reconcile(Some(&order()), Some(&stray), Some(&invoice()))
        .expect_err("foreign receipt rejected");
    assert!(matches!(error, ReconcileError::ForeignReceipt { .. }));
}

#[test]
fn negative_amounts_abort_the_reconciliation() {
    let mut invoice = invoice();
    invoice.lines[0].unit_price = dec("-1.00");

    let error = engine()
        .reconcile(Some(&order()), Some(&receipt()), Some(&invoice))
        .expect_err("negative price rejected");
    assert!(matches!(
        error,
        ReconcileError::Amount(AmountError::Negative { .. })
    ));
}
