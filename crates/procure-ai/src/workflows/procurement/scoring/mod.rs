//! Supplier performance scoring.
//!
//! Four independent dimensions — punctuality, conformity, price
//! competitiveness, reliability — each derived from document history over a
//! caller-supplied date window, combined into a composite. A dimension with
//! no data stays `None` and is excluded from the composite; sparse history
//! must never read as a zero score.

mod config;
mod dimensions;
pub mod history;
pub mod router;

#[cfg(test)]
mod tests;

pub use config::{PeerAveraging, ScoringConfig};
pub use history::{DateRange, HistoryError, PeerPrice, ProductPrice, SupplierHistory};
pub use router::scoring_router;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::SupplierId;
use super::money::{self, AmountError};

/// One axis of supplier performance with the sample it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDimension {
    pub score: Option<u8>,
    pub numerator: u32,
    pub denominator: u32,
}

impl ScoreDimension {
    pub(crate) fn from_counts(numerator: u32, denominator: u32) -> Self {
        let score = (denominator > 0).then(|| {
            round_to_score(Decimal::from(numerator) * Decimal::ONE_HUNDRED / Decimal::from(denominator))
        });
        Self {
            score,
            numerator,
            denominator,
        }
    }

    pub(crate) const fn empty() -> Self {
        Self {
            score: None,
            numerator: 0,
            denominator: 0,
        }
    }
}

/// Snapshot of a supplier's performance over one date window.
///
/// A pure read-model: always derivable from source rows, so persisting one
/// is a cache, never a record of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierScore {
    pub supplier_id: SupplierId,
    pub composite: Option<u8>,
    pub punctuality: ScoreDimension,
    pub conformity: ScoreDimension,
    pub price_competitiveness: ScoreDimension,
    pub reliability: ScoreDimension,
    pub data_range: DateRange,
    pub calculated_at: DateTime<Utc>,
}

impl SupplierScore {
    pub fn dimensions(&self) -> [&ScoreDimension; 4] {
        [
            &self.punctuality,
            &self.conformity,
            &self.price_competitiveness,
            &self.reliability,
        ]
    }
}

/// Error raised while computing one supplier's score. Fatal for that
/// supplier only; scoring other suppliers is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Stateless engine deriving the performance dimensions from injected
/// history. Scoring different suppliers shares nothing and can run in
/// parallel.
pub struct SupplierScoringEngine {
    config: ScoringConfig,
}

impl SupplierScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score<H>(
        &self,
        supplier: &SupplierId,
        range: DateRange,
        history: &H,
    ) -> Result<SupplierScore, ScoringError>
    where
        H: SupplierHistory + ?Sized,
    {
        let orders = history.orders(supplier, &range)?;
        let receipts = history.receipts(supplier, &range)?;

        let punctuality =
            dimensions::punctuality(&orders, &receipts, self.config.delivery_grace_days);
        let conformity = dimensions::conformity(&receipts);
        let price_competitiveness = self.price_competitiveness(supplier, history)?;
        let reliability = dimensions::reliability(&orders);

        let composite = composite_of([
            &punctuality,
            &conformity,
            &price_competitiveness,
            &reliability,
        ]);
        if composite.is_none() {
            debug!(supplier = %supplier.0, "no dimension had enough data; composite left unset");
        }

        Ok(SupplierScore {
            supplier_id: supplier.clone(),
            composite,
            punctuality,
            conformity,
            price_competitiveness,
            reliability,
            data_range: range,
            calculated_at: Utc::now(),
        })
    }

    /// Compare the supplier's catalog against peer averages.
    ///
    /// Cheaper-than-peers and average-priced suppliers score high; the
    /// penalty grows linearly once prices sit above the peer average and is
    /// uncapped below zero only by the final clamp. The reported sample is
    /// products priced at or below peer average over products compared.
    fn price_competitiveness<H>(
        &self,
        supplier: &SupplierId,
        history: &H,
    ) -> Result<ScoreDimension, ScoringError>
    where
        H: SupplierHistory + ?Sized,
    {
        let catalog = history.catalog_prices(supplier)?;

        let mut deviations: Vec<Decimal> = Vec::with_capacity(catalog.len());
        let mut at_or_below = 0u32;
        for entry in &catalog {
            money::non_negative("catalog price", entry.price)?;
            let peers = history.peer_prices(&entry.product_id)?;
            for peer in &peers {
                money::non_negative("peer price", peer.price)?;
            }

            let Some(deviation) = dimensions::price_deviation(
                supplier,
                entry.price,
                &peers,
                self.config.peer_averaging,
            ) else {
                debug!(product = %entry.product_id.0, "no peer baseline for product; skipping");
                continue;
            };

            if deviation <= Decimal::ZERO {
                at_or_below += 1;
            }
            deviations.push(deviation);
        }

        if deviations.is_empty() {
            return Ok(ScoreDimension::empty());
        }

        let compared = deviations.len() as u32;
        let mean_deviation =
            deviations.iter().copied().sum::<Decimal>() / Decimal::from(compared);
        let penalty = mean_deviation.max(Decimal::ZERO);
        let score = round_to_score(Decimal::ONE_HUNDRED - penalty);

        Ok(ScoreDimension {
            score: Some(score),
            numerator: at_or_below,
            denominator: compared,
        })
    }
}

/// Mean of the dimensions that have data; `None` only when every dimension
/// is unknown. An unknown dimension is excluded, never counted as zero.
fn composite_of(dimensions: [&ScoreDimension; 4]) -> Option<u8> {
    let known: Vec<u32> = dimensions
        .iter()
        .filter_map(|dimension| dimension.score)
        .map(u32::from)
        .collect();
    if known.is_empty() {
        return None;
    }

    let sum: u32 = known.iter().sum();
    let mean = Decimal::from(sum) / Decimal::from(known.len() as u32);
    Some(round_to_score(mean))
}

fn round_to_score(value: Decimal) -> u8 {
    let clamped = value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let rounded = clamped.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_u32().unwrap_or(0) as u8
}
