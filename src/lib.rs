//! neurochain - incident lifecycle tracking with a tamper-evident ledger
//!
//! - `ledger`: append-only incident event log
//! - `chain`: hash chain over content-bearing records
//! - `incident`: incident entity and state machine
//! - `priority`: total risk scoring
//! - `tracker`: per-incident serialised orchestration of the above

pub mod analysis;
pub mod chain;
pub mod cli;
pub mod clock;
pub mod config;
pub mod incident;
pub mod ledger;
pub mod observability;
pub mod priority;
pub mod responder;
pub mod store;
pub mod tracker;
