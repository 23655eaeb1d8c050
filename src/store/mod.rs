//! SQLite-backed record store.
//!
//! One table per [`RecordKind`]. Connection-level queries live in [`record`];
//! [`RecordStore`] owns the pool and scopes a transaction around each call.

pub mod kind;
pub mod record;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::StoreError;
use crate::lookup::{AddressFields, Cep};

pub use kind::RecordKind;
pub use record::Record;

/// Database connection pool plus record operations.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Connect using the configured URL and pool size.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::connect(&config.database_url, config.db_max_connections).await
    }

    /// Connect (creating the database file and its directory if missing).
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Database(e.into()))?;
            }
        }

        info!("Connecting to SQLite database at {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create missing tables. Existing tables are never altered.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for kind in RecordKind::iter() {
            sqlx::query(&kind.create_table_sql())
                .execute(&self.pool)
                .await?;
            debug!(table = kind.table(), "Table ready");
        }
        Ok(())
    }

    /// Start a transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a record and commit.
    pub async fn insert(
        &self,
        kind: RecordKind,
        cep: &Cep,
        address: &AddressFields,
    ) -> Result<Record, StoreError> {
        let mut tx = self.begin().await?;
        let created = record::insert(&mut tx, kind, cep, address).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Fetch one record by id.
    pub async fn fetch(&self, kind: RecordKind, id: i64) -> Result<Option<Record>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        record::find(&mut conn, kind, id).await
    }

    /// Fetch every record of a kind.
    pub async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        record::list(&mut conn, kind).await
    }

    /// Replace the CEP and derived fields of a row and commit, returning the
    /// number of rows changed.
    pub async fn overwrite_address(
        &self,
        kind: RecordKind,
        id: i64,
        cep: &Cep,
        address: &AddressFields,
    ) -> Result<u64, StoreError> {
        let mut tx = self.begin().await?;
        let changed = record::overwrite_address(&mut tx, kind, id, cep, address).await?;
        tx.commit().await?;
        Ok(changed)
    }

    /// Delete by id and commit, returning the number of rows removed.
    pub async fn delete(&self, kind: RecordKind, id: i64) -> Result<u64, StoreError> {
        let mut tx = self.begin().await?;
        let removed = record::delete(&mut tx, kind, id).await?;
        tx.commit().await?;
        Ok(removed)
    }
}
