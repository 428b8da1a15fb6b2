//! Procurement automation core.
//!
//! The interesting machinery lives under [`workflows::procurement`]: the
//! three-way match between purchase orders, goods receipts, and supplier
//! invoices, and the supplier performance scoring derived from the same
//! document history. Everything else is the service scaffolding around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
