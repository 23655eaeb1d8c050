//! CEP and lookup result types.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

static CEP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{5})-?([0-9]{3})$").expect("valid regex"));

/// A Brazilian postal code, normalized to eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cep(String);

impl Cep {
    /// Number of digits in a CEP.
    pub const LEN: usize = 8;

    /// Parse `21240050` or `21240-050`, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let trimmed = raw.trim();
        let caps = CEP_PATTERN
            .captures(trimmed)
            .ok_or_else(|| LookupError::InvalidCep(raw.to_string()))?;
        Ok(Self(format!("{}{}", &caps[1], &caps[2])))
    }

    /// The eight digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cep {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Address components resolved from a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressFields {
    /// Street (`logradouro`).
    pub street: Option<String>,
    /// Neighborhood (`bairro`).
    pub neighborhood: Option<String>,
    /// City (`localidade`).
    pub city: Option<String>,
    /// Two-letter state code (`uf`).
    pub state: Option<String>,
}

/// What the provider said about a CEP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The CEP exists and resolved to these fields.
    Resolved(AddressFields),
    /// The provider does not know the CEP.
    NotFound,
}

impl LookupOutcome {
    /// Check if the CEP resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, LookupOutcome::Resolved(_))
    }

    /// Take the resolved fields, if any.
    pub fn into_fields(self) -> Option<AddressFields> {
        match self {
            LookupOutcome::Resolved(fields) => Some(fields),
            LookupOutcome::NotFound => None,
        }
    }
}

/// JSON body returned by ViaCEP.
#[derive(Debug, Clone, Deserialize)]
pub struct ViaCepResponse {
    /// Echoed CEP, formatted `NNNNN-NNN`.
    #[serde(default)]
    pub cep: Option<String>,
    /// Street.
    #[serde(default)]
    pub logradouro: Option<String>,
    /// Neighborhood.
    #[serde(default)]
    pub bairro: Option<String>,
    /// City.
    #[serde(default)]
    pub localidade: Option<String>,
    /// State.
    #[serde(default)]
    pub uf: Option<String>,
    /// Present (as `true` or `"true"`) when the CEP is unknown.
    #[serde(default)]
    pub erro: Option<serde_json::Value>,
}

impl From<ViaCepResponse> for LookupOutcome {
    fn from(response: ViaCepResponse) -> Self {
        if response.erro.is_some() {
            return LookupOutcome::NotFound;
        }

        LookupOutcome::Resolved(AddressFields {
            street: response.logradouro,
            neighborhood: response.bairro,
            city: response.localidade,
            state: response.uf,
        })
    }
}
