//! Cliente and endereço registry enriched by CEP lookup.
//!
//! Records are created from a CEP alone: the street, neighborhood, city and
//! state are filled in by the postal-code provider (ViaCEP) and stored in
//! SQLite. Updating a record with a different CEP re-resolves all four fields.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`lookup`]: CEP normalization and the provider client
//! - [`store`]: SQLite record tables
//! - [`api`]: HTTP API for records, CEP consult, health and metrics
//! - [`metrics`]: Prometheus counters and histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod lookup;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, LookupError, StoreError};
