//! Record rows and the queries that touch them.
//!
//! Every function here runs on a caller-supplied connection so the caller
//! decides the transaction scope.

use chrono::NaiveDateTime;
use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::lookup::{AddressFields, Cep};

use super::kind::RecordKind;

/// A stored cliente/endereco row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Record {
    /// Auto-assigned identifier.
    pub id: i64,
    /// Normalized CEP.
    pub cep: String,
    /// Street.
    #[sqlx(rename = "endereco")]
    pub street: Option<String>,
    /// Neighborhood.
    #[sqlx(rename = "bairro")]
    pub neighborhood: Option<String>,
    /// City.
    #[sqlx(rename = "localidade")]
    pub city: Option<String>,
    /// State.
    #[sqlx(rename = "uf")]
    pub state: Option<String>,
    /// When the row was inserted (local time).
    #[sqlx(rename = "data_insercao")]
    pub inserted_at: NaiveDateTime,
}

impl Record {
    /// The address fields as a lookup would return them.
    pub fn address(&self) -> AddressFields {
        AddressFields {
            street: self.street.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}

fn columns(kind: RecordKind) -> String {
    format!(
        "{} AS id, cep, endereco, bairro, localidade, uf, data_insercao",
        kind.pk_column()
    )
}

/// Insert a row and return it as stored.
#[instrument(skip(conn, address), fields(kind = %kind, cep = %cep))]
pub async fn insert(
    conn: &mut SqliteConnection,
    kind: RecordKind,
    cep: &Cep,
    address: &AddressFields,
) -> Result<Record, StoreError> {
    let sql = format!(
        "INSERT INTO {} (cep, endereco, bairro, localidade, uf, data_insercao)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {}",
        kind.table(),
        columns(kind)
    );

    let record = sqlx::query_as::<_, Record>(&sql)
        .bind(cep.as_str())
        .bind(address.street.as_deref())
        .bind(address.neighborhood.as_deref())
        .bind(address.city.as_deref())
        .bind(address.state.as_deref())
        .bind(chrono::Local::now().naive_local())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(kind.table(), e))?;

    debug!(id = record.id, "Inserted record");
    Ok(record)
}

/// Find a row by id.
#[instrument(skip(conn), fields(kind = %kind))]
pub async fn find(
    conn: &mut SqliteConnection,
    kind: RecordKind,
    id: i64,
) -> Result<Option<Record>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        columns(kind),
        kind.table(),
        kind.pk_column()
    );

    Ok(sqlx::query_as::<_, Record>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

/// All rows of a kind, in id order.
#[instrument(skip(conn), fields(kind = %kind))]
pub async fn list(conn: &mut SqliteConnection, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns(kind),
        kind.table(),
        kind.pk_column()
    );

    Ok(sqlx::query_as::<_, Record>(&sql)
        .fetch_all(&mut *conn)
        .await?)
}

/// Delete by id, returning how many rows went away.
#[instrument(skip(conn), fields(kind = %kind))]
pub async fn delete(conn: &mut SqliteConnection, kind: RecordKind, id: i64) -> Result<u64, StoreError> {
    let sql = format!("DELETE FROM {} WHERE {} = ?", kind.table(), kind.pk_column());

    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Replace the CEP and all four derived fields of a row.
#[instrument(skip(conn, address), fields(kind = %kind, cep = %cep))]
pub async fn overwrite_address(
    conn: &mut SqliteConnection,
    kind: RecordKind,
    id: i64,
    cep: &Cep,
    address: &AddressFields,
) -> Result<u64, StoreError> {
    let sql = format!(
        "UPDATE {} SET cep = ?, endereco = ?, bairro = ?, localidade = ?, uf = ? WHERE {} = ?",
        kind.table(),
        kind.pk_column()
    );

    let result = sqlx::query(&sql)
        .bind(cep.as_str())
        .bind(address.street.as_deref())
        .bind(address.neighborhood.as_deref())
        .bind(address.city.as_deref())
        .bind(address.state.as_deref())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::classify(kind.table(), e))?;

    Ok(result.rows_affected())
}
