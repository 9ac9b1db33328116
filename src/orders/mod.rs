//! Order Reconciliation
//!
//! - [`reconcile`] — pure three-way diff between current and requested items
//! - [`engine`] — transactional application against the inventory ledger

pub mod engine;
pub mod reconcile;

pub use engine::OrderEngine;
pub use reconcile::{CarriedLine, ChangedLine, ReconcilePlan};
