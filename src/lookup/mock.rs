//! In-process CEP lookup for tests and offline runs.
//!
//! Resolves only the CEPs it was seeded with and never touches the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::error::LookupError;

use super::client::CepLookup;
use super::types::{AddressFields, Cep, LookupOutcome};

/// Mock lookup behavior switches.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fail every call as if the provider were unreachable.
    pub fail_transport: bool,
}

/// Mock CEP lookup backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MockCepLookup {
    config: MockConfig,
    known: Arc<Mutex<HashMap<String, AddressFields>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCepLookup {
    /// Create an empty mock that knows no CEPs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with custom behavior.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a resolvable CEP.
    pub fn insert(&self, cep: &str, fields: AddressFields) {
        let cep = Cep::parse(cep).expect("mock CEPs must be well formed");
        self.known.lock().unwrap().insert(cep.as_str().to_string(), fields);
    }

    /// Builder form of [`MockCepLookup::insert`].
    pub fn with_cep(self, cep: &str, fields: AddressFields) -> Self {
        self.insert(cep, fields);
        self
    }

    /// Number of lookups and consults served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_transport {
            return Err(LookupError::Unavailable("mock transport failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CepLookup for MockCepLookup {
    async fn lookup(&self, cep: &Cep) -> Result<LookupOutcome, LookupError> {
        self.begin_call()?;

        let known = self.known.lock().unwrap();
        Ok(match known.get(cep.as_str()) {
            Some(fields) => LookupOutcome::Resolved(fields.clone()),
            None => LookupOutcome::NotFound,
        })
    }

    async fn consult(&self, cep: &Cep) -> Result<serde_json::Value, LookupError> {
        self.begin_call()?;

        let known = self.known.lock().unwrap();
        Ok(match known.get(cep.as_str()) {
            Some(fields) => json!({
                "cep": format!("{}-{}", &cep.as_str()[..5], &cep.as_str()[5..]),
                "logradouro": fields.street,
                "bairro": fields.neighborhood,
                "localidade": fields.city,
                "uf": fields.state,
            }),
            None => json!({ "erro": true }),
        })
    }
}

/// Fields ViaCEP returns for `21240-050`.
pub fn rio_fields() -> AddressFields {
    AddressFields {
        street: Some("Rua Guaporé".to_string()),
        neighborhood: Some("Brás de Pina".to_string()),
        city: Some("Rio de Janeiro".to_string()),
        state: Some("RJ".to_string()),
    }
}

/// Fields ViaCEP returns for `01001-000`.
pub fn sao_paulo_fields() -> AddressFields {
    AddressFields {
        street: Some("Praça da Sé".to_string()),
        neighborhood: Some("Sé".to_string()),
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_resolves_seeded_cep() {
        let mock = MockCepLookup::new().with_cep("21240050", rio_fields());

        let cep = Cep::parse("21240-050").unwrap();
        let outcome = mock.lookup(&cep).await.unwrap();
        assert_eq!(outcome, LookupOutcome::Resolved(rio_fields()));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn mock_reports_unknown_cep() {
        let mock = MockCepLookup::new();

        let cep = Cep::parse("99999999").unwrap();
        assert_eq!(mock.lookup(&cep).await.unwrap(), LookupOutcome::NotFound);
        assert_eq!(mock.consult(&cep).await.unwrap(), json!({ "erro": true }));
    }

    #[tokio::test]
    async fn mock_failure_mode() {
        let mock = MockCepLookup::with_config(MockConfig {
            fail_transport: true,
        });

        let cep = Cep::parse("21240050").unwrap();
        assert!(mock.lookup(&cep).await.is_err());
        assert!(mock.consult(&cep).await.is_err());
    }
}
