use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use procure_ai::error::AppError;
use procure_ai::workflows::procurement::domain::{
    GoodsReceipt, Invoice, InvoiceId, InvoiceLine, InvoiceLineId, OrderId, OrderLine, OrderLineId,
    OrderStatus, ProductId, ProductSnapshot, PurchaseOrder, ReceiptId, ReceiptLine, ReceiptLineId,
    SupplierId,
};
use procure_ai::workflows::procurement::reconciliation::{
    DiscrepancyDetail, ReconcileOptions, ReconciliationService,
};
use procure_ai::workflows::procurement::scoring::{
    DateRange, PeerPrice, ProductPrice, ScoringConfig, SupplierScore, SupplierScoringEngine,
};
use rust_decimal::Decimal;

use crate::infra::{InMemoryReconciliationRepository, InMemorySupplierHistory};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the scoring portion (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Supplier to score (the demo history seeds "sup-nordic")
    #[arg(long, default_value = "sup-nordic")]
    pub(crate) supplier: String,
    /// Window start (YYYY-MM-DD); defaults to twelve months before the end
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Window end (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
}

fn dec(value: &str) -> Decimal {
    value.parse().expect("demo literals are valid decimals")
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("demo literals are valid dates")
}

fn demo_supplier() -> SupplierId {
    SupplierId("sup-nordic".to_string())
}

fn demo_order() -> PurchaseOrder {
    PurchaseOrder {
        id: OrderId("po-7001".to_string()),
        supplier_id: demo_supplier(),
        status: OrderStatus::Received,
        sent_at: Some(date("2025-06-02")),
        expected_delivery: Some(date("2025-06-10")),
        lines: vec![
            OrderLine {
                id: OrderLineId("ol-1".to_string()),
                product: Some(ProductSnapshot {
                    id: ProductId("P-100".to_string()),
                    name: "Copper tubing 15mm".to_string(),
                    vat_rate: Some(dec("20")),
                }),
                description: None,
                quantity: dec("40"),
                unit_price: dec("3.80"),
            },
            OrderLine {
                id: OrderLineId("ol-2".to_string()),
                product: Some(ProductSnapshot {
                    id: ProductId("P-210".to_string()),
                    name: "Brass elbow 90deg".to_string(),
                    vat_rate: Some(dec("20")),
                }),
                description: None,
                quantity: dec("100"),
                unit_price: dec("0.95"),
            },
        ],
    }
}

fn demo_receipt() -> GoodsReceipt {
    GoodsReceipt {
        id: ReceiptId("gr-8001".to_string()),
        order_id: OrderId("po-7001".to_string()),
        received_at: Some(date("2025-06-09")),
        lines: vec![
            ReceiptLine {
                id: ReceiptLineId("rl-1".to_string()),
                order_line_id: OrderLineId("ol-1".to_string()),
                quantity_received: Some(dec("40")),
                is_conforming: true,
                non_conformity_note: None,
            },
            ReceiptLine {
                id: ReceiptLineId("rl-2".to_string()),
                order_line_id: OrderLineId("ol-2".to_string()),
                quantity_received: Some(dec("96")),
                is_conforming: false,
                non_conformity_note: Some("4 units crushed in transit".to_string()),
            },
        ],
    }
}

fn demo_invoice() -> Invoice {
    Invoice {
        id: InvoiceId("inv-5001".to_string()),
        supplier_id: demo_supplier(),
        lines: vec![
            InvoiceLine {
                id: InvoiceLineId("il-1".to_string()),
                product_id: Some(ProductId("P-100".to_string())),
                description: Some("Copper tubing 15mm".to_string()),
                quantity: dec("40"),
                unit_price: dec("4.10"),
                line_total: dec("164.00"),
                vat_rate: Some(dec("20")),
            },
            InvoiceLine {
                id: InvoiceLineId("il-2".to_string()),
                product_id: Some(ProductId("P-210".to_string())),
                description: Some("Brass elbow 90deg".to_string()),
                quantity: dec("100"),
                unit_price: dec("0.95"),
                line_total: dec("95.00"),
                vat_rate: Some(dec("20")),
            },
            InvoiceLine {
                id: InvoiceLineId("il-3".to_string()),
                product_id: None,
                description: Some("Pallet surcharge".to_string()),
                quantity: dec("1"),
                unit_price: dec("18.00"),
                line_total: dec("18.00"),
                vat_rate: Some(dec("20")),
            },
        ],
    }
}

/// Twelve months of seeded history for the demo supplier.
pub(crate) fn seed_history() -> InMemorySupplierHistory {
    let mut history = InMemorySupplierHistory::default();

    for month in 1..=6u32 {
        let sent = NaiveDate::from_ymd_opt(2025, month, 3).expect("valid seed date");
        let expected = NaiveDate::from_ymd_opt(2025, month, 12).expect("valid seed date");
        // The March delivery slips past its deadline; the rest arrive early.
        let received = if month == 3 {
            NaiveDate::from_ymd_opt(2025, month, 15).expect("valid seed date")
        } else {
            NaiveDate::from_ymd_opt(2025, month, 10).expect("valid seed date")
        };

        let order_id = OrderId(format!("po-6{month:02}"));
        history.orders.push(PurchaseOrder {
            id: order_id.clone(),
            supplier_id: demo_supplier(),
            status: if month == 5 {
                OrderStatus::Cancelled
            } else {
                OrderStatus::Closed
            },
            sent_at: Some(sent),
            expected_delivery: Some(expected),
            lines: Vec::new(),
        });
        history.receipts.push(GoodsReceipt {
            id: ReceiptId(format!("gr-6{month:02}")),
            order_id,
            received_at: Some(received),
            lines: vec![
                ReceiptLine {
                    id: ReceiptLineId(format!("rl-6{month:02}a")),
                    order_line_id: OrderLineId(format!("ol-6{month:02}a")),
                    quantity_received: Some(dec("10")),
                    is_conforming: true,
                    non_conformity_note: None,
                },
                ReceiptLine {
                    id: ReceiptLineId(format!("rl-6{month:02}b")),
                    order_line_id: OrderLineId(format!("ol-6{month:02}b")),
                    quantity_received: Some(dec("10")),
                    is_conforming: month != 2,
                    non_conformity_note: (month == 2).then(|| "wrong gauge".to_string()),
                },
            ],
        });
    }

    history.catalogs = HashMap::from([(
        demo_supplier(),
        vec![
            ProductPrice {
                product_id: ProductId("P-100".to_string()),
                price: dec("3.80"),
            },
            ProductPrice {
                product_id: ProductId("P-210".to_string()),
                price: dec("0.95"),
            },
        ],
    )]);
    history.peers = HashMap::from([
        (
            ProductId("P-100".to_string()),
            vec![
                PeerPrice { supplier_id: demo_supplier(), price: dec("3.80") },
                PeerPrice { supplier_id: SupplierId("sup-baltic".to_string()), price: dec("4.00") },
                PeerPrice { supplier_id: SupplierId("sup-rhine".to_string()), price: dec("4.20") },
            ],
        ),
        (
            ProductId("P-210".to_string()),
            vec![
                PeerPrice { supplier_id: demo_supplier(), price: dec("0.95") },
                PeerPrice { supplier_id: SupplierId("sup-baltic".to_string()), price: dec("0.90") },
                PeerPrice { supplier_id: SupplierId("sup-rhine".to_string()), price: dec("1.00") },
            ],
        ),
    ]);

    history
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let to = args.to.unwrap_or_else(|| Local::now().date_naive());
    let range = match args.from {
        Some(from) => DateRange::new(from, to),
        None => DateRange::trailing_months(to, 12),
    };

    let engine = SupplierScoringEngine::new(ScoringConfig::default());
    let history = seed_history();
    let supplier = SupplierId(args.supplier);

    match engine.score(&supplier, range, &history) {
        Ok(score) => {
            render_score(&score);
            Ok(())
        }
        Err(err) => {
            eprintln!("could not score supplier {}: {err}", supplier.0);
            Ok(())
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Procurement workflow demo");

    let repository = Arc::new(InMemoryReconciliationRepository::default());
    let service = ReconciliationService::new(repository, ReconcileOptions::default());

    let order = demo_order();
    let receipt = demo_receipt();
    let invoice = demo_invoice();
    println!(
        "\nThree-way match: order {} / receipt {} / invoice {}",
        order.id.0, receipt.id.0, invoice.id.0
    );

    match service.reconcile_invoice(Some(&order), Some(&receipt), &invoice) {
        Ok(record) => {
            println!(
                "- status {} | ordered {} | received {} | invoiced {}",
                record.status.label(),
                record.total_ordered,
                record.total_received,
                record.total_invoiced
            );
            if record.discrepancy_details.is_empty() {
                println!("- no discrepancies");
            } else {
                println!(
                    "- {} discrepancy(ies), net impact {}",
                    record.discrepancy_details.len(),
                    record.discrepancy_amount
                );
                for detail in &record.discrepancy_details {
                    render_detail(detail);
                }
            }
        }
        Err(err) => eprintln!("reconciliation failed: {err}"),
    }

    let range = DateRange::trailing_months(today, 12);
    let engine = SupplierScoringEngine::new(ScoringConfig::default());
    match engine.score(&demo_supplier(), range, &seed_history()) {
        Ok(score) => {
            println!("\nSupplier performance: {}", score.supplier_id.0);
            render_score(&score);
        }
        Err(err) => eprintln!("scoring failed: {err}"),
    }

    Ok(())
}

fn render_detail(detail: &DiscrepancyDetail) {
    match detail {
        DiscrepancyDetail::UnauthorizedItem {
            invoice_line_id,
            amount,
        } => {
            println!("  - unauthorized item on {}: {}", invoice_line_id.0, amount);
        }
        DiscrepancyDetail::QuantityMismatch {
            expected,
            actual,
            amount,
            ..
        }
        | DiscrepancyDetail::Overcharge {
            expected,
            actual,
            amount,
            ..
        }
        | DiscrepancyDetail::VatError {
            expected,
            actual,
            amount,
            ..
        } => {
            println!(
                "  - {}: expected {} actual {} impact {}",
                detail.kind(),
                expected,
                actual,
                amount
            );
        }
    }
}

fn render_score(score: &SupplierScore) {
    let dimensions = [
        ("punctuality", &score.punctuality),
        ("conformity", &score.conformity),
        ("price competitiveness", &score.price_competitiveness),
        ("reliability", &score.reliability),
    ];
    println!(
        "Window: {} -> {}",
        score.data_range.from, score.data_range.to
    );
    for (name, dimension) in dimensions {
        match dimension.score {
            Some(value) => println!(
                "- {name}: {value} ({}/{})",
                dimension.numerator, dimension.denominator
            ),
            None => println!("- {name}: insufficient data"),
        }
    }
    match score.composite {
        Some(composite) => println!("Composite: {composite}"),
        None => println!("Composite: insufficient data"),
    }
}
