//! In-memory field-service core for an HVAC dispatch demo.
//!
//! [`store::AppStore`] owns jobs and invoices, keeps their statuses in step,
//! and simulates delivering invoices drafted while offline once the
//! [`connectivity`] signal reports the device is back online.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod invoice_gen;
pub mod models;
pub mod seed;
pub mod store;
pub mod views;

pub use error::{Error, Result};
pub use store::{AppStore, Snapshot, StoreEvent, StoreOptions};
