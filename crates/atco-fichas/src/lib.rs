//! Role-gated record keeping for ATCO practical evaluation forms.
//!
//! The crate exposes the domain services (accounts, evaluation fichas,
//! template catalog, reports, tabular transfer) together with the
//! authorization policy they all consult and the record-store seam the
//! API service plugs a backend into.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod policy;
pub mod reports;
pub mod store;
pub mod telemetry;
pub mod transfer;
