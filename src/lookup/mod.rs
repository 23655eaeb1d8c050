//! Postal-code (CEP) lookup.
//!
//! This module handles:
//! - CEP parsing and lookup result types
//! - The ViaCEP HTTP client
//! - Mock lookup for testing

pub mod client;
pub mod mock;
pub mod types;

pub use client::{CepLookup, ViaCepClient};
pub use mock::{MockCepLookup, MockConfig};
pub use types::{AddressFields, Cep, LookupOutcome, ViaCepResponse};
