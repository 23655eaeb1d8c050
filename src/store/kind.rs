//! The two record kinds served by the API.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::lookup::Cep;

/// Which table a record lives in.
///
/// Both kinds share the same shape; only names differ.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordKind {
    /// Customer records (`cliente` table).
    Cliente,
    /// Address records (`endereco` table).
    Endereco,
}

impl RecordKind {
    /// Table name.
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Cliente => "cliente",
            RecordKind::Endereco => "endereco",
        }
    }

    /// Primary key column.
    pub fn pk_column(&self) -> &'static str {
        match self {
            RecordKind::Cliente => "pk_cliente",
            RecordKind::Endereco => "pk_endereco",
        }
    }

    /// Lowercase label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Cliente => "cliente",
            RecordKind::Endereco => "endereço",
        }
    }

    /// Capitalized label used in messages.
    pub fn title(&self) -> &'static str {
        match self {
            RecordKind::Cliente => "Cliente",
            RecordKind::Endereco => "Endereço",
        }
    }

    /// Key wrapping the list response.
    pub fn list_key(&self) -> &'static str {
        match self {
            RecordKind::Cliente => "clientes",
            RecordKind::Endereco => "enderecos",
        }
    }

    /// `CREATE TABLE` statement for this kind.
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                {pk} INTEGER PRIMARY KEY AUTOINCREMENT,
                cep VARCHAR({cep_len}) NOT NULL CHECK (length(cep) <= {cep_len}),
                endereco VARCHAR(4000) CHECK (length(endereco) <= 4000),
                bairro VARCHAR(4000) CHECK (length(bairro) <= 4000),
                localidade VARCHAR(4000) CHECK (length(localidade) <= 4000),
                uf VARCHAR(2) CHECK (length(uf) <= 2),
                data_insercao DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            table = self.table(),
            pk = self.pk_column(),
            cep_len = Cep::LEN,
        )
    }
}
