use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use super::super::domain::{GoodsReceipt, OrderId, PurchaseOrder, SupplierId};
use super::config::PeerAveraging;
use super::history::PeerPrice;
use super::ScoreDimension;

/// Share of deliveries that arrived by their deadline.
///
/// The deadline is the order's expected delivery date, falling back to the
/// send date plus the grace window. Receipts whose order carries neither
/// date — or whose order is not in the supplied history — have no deadline
/// and are left out of the sample rather than guessed at.
pub(crate) fn punctuality(
    orders: &[PurchaseOrder],
    receipts: &[GoodsReceipt],
    grace_days: i64,
) -> ScoreDimension {
    let deadlines: HashMap<&OrderId, NaiveDate> = orders
        .iter()
        .filter_map(|order| {
            order
                .expected_delivery
                .or_else(|| order.sent_at.map(|sent| sent + Duration::days(grace_days)))
                .map(|deadline| (&order.id, deadline))
        })
        .collect();

    let mut on_time = 0u32;
    let mut sampled = 0u32;
    for receipt in receipts {
        let Some(received_at) = receipt.received_at else {
            continue;
        };
        let Some(deadline) = deadlines.get(&receipt.order_id) else {
            continue;
        };
        sampled += 1;
        if received_at <= *deadline {
            on_time += 1;
        }
    }

    ScoreDimension::from_counts(on_time, sampled)
}

/// Share of receiving lines flagged conforming.
pub(crate) fn conformity(receipts: &[GoodsReceipt]) -> ScoreDimension {
    let mut conforming = 0u32;
    let mut total = 0u32;
    for line in receipts.iter().flat_map(|receipt| &receipt.lines) {
        total += 1;
        if line.is_conforming {
            conforming += 1;
        }
    }

    ScoreDimension::from_counts(conforming, total)
}

/// Percentage deviation of one product's price from its peer average, or
/// `None` when no usable baseline exists.
pub(crate) fn price_deviation(
    supplier: &SupplierId,
    price: Decimal,
    peers: &[PeerPrice],
    policy: PeerAveraging,
) -> Option<Decimal> {
    let competitors: Vec<Decimal> = peers
        .iter()
        .filter(|peer| &peer.supplier_id != supplier)
        .map(|peer| peer.price)
        .collect();

    let pool: Vec<Decimal> = match policy {
        PeerAveraging::ExcludeSelf { min_peers } if competitors.len() >= min_peers => competitors,
        _ => peers.iter().map(|peer| peer.price).collect(),
    };

    if pool.is_empty() {
        return None;
    }
    let total: Decimal = pool.iter().copied().sum();
    let average = total / Decimal::from(pool.len() as u64);
    if average.is_zero() {
        return None;
    }

    Some((price - average) / average * Decimal::ONE_HUNDRED)
}

/// Share of non-draft orders that reached a fulfilled terminal status.
/// Cancelled orders stay in the denominator and count against the supplier.
pub(crate) fn reliability(orders: &[PurchaseOrder]) -> ScoreDimension {
    let mut fulfilled = 0u32;
    let mut placed = 0u32;
    for order in orders {
        if order.status.is_draft() {
            continue;
        }
        placed += 1;
        if order.status.is_fulfilled() {
            fulfilled += 1;
        }
    }

    ScoreDimension::from_counts(fulfilled, placed)
}
