use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which quantity an invoice is checked against when the goods receipt and
/// the purchase order disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantityBaseline {
    /// Bill what was physically received (default). Falls back to the
    /// ordered quantity while no count has been recorded.
    #[default]
    Received,
    /// Bill what was ordered, ignoring receiving data.
    Ordered,
}

/// Tolerances applied before a mismatch is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReconcileOptions {
    /// Allowed unit-price increase before an overcharge is flagged.
    #[serde(default)]
    pub price_tolerance: Decimal,
    /// Allowed quantity delta before a mismatch is flagged.
    #[serde(default)]
    pub quantity_tolerance: Decimal,
    #[serde(default)]
    pub quantity_baseline: QuantityBaseline,
}
