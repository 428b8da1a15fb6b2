use serde::{Deserialize, Serialize};

/// How peer averages treat the scored supplier's own price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerAveraging {
    /// Drop the supplier's own listing when at least `min_peers` competitors
    /// price the product; fall back to including it below that quorum.
    ExcludeSelf { min_peers: usize },
    /// Average over every listing, the scored supplier's included.
    IncludeSelf,
}

/// Dials for the supplier performance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Days after `sent_at` a delivery still counts as on time when the
    /// order carries no expected delivery date.
    pub delivery_grace_days: i64,
    pub peer_averaging: PeerAveraging,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            delivery_grace_days: 2,
            peer_averaging: PeerAveraging::ExcludeSelf { min_peers: 2 },
        }
    }
}
