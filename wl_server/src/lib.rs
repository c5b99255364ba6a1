//! HTTP front end for the wallet ledger.
//!
//! Exposes wallet lookup, creation and deposit/withdraw over JSON, with
//! request correlation, structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
