//! Procurement document matching and supplier analytics.
//!
//! Everything in this tree operates on already-fetched document snapshots:
//! the engines perform no I/O and never block, so the caller owns
//! transactions, retries, and timeouts.

pub mod domain;
pub mod money;
pub mod reconciliation;
pub mod scoring;
