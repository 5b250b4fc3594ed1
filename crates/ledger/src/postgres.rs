use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{LedgerFields, LedgerStore, Result};

/// PostgreSQL-backed ledger store implementation.
///
/// Every collection lives in the single `ledger_records` table, keyed by
/// `(collection, record_key)` with the fields stored as a JSON object.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store over a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[tracing::instrument(skip(self, fields))]
    async fn put(&self, collection: &str, key: &str, fields: LedgerFields) -> Result<()> {
        let fields_json = serde_json::to_value(&fields)?;

        sqlx::query(
            r#"
            INSERT INTO ledger_records (collection, record_key, fields, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (collection, record_key)
            DO UPDATE SET fields = EXCLUDED.fields, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(fields_json)
        .execute(&self.pool)
        .await?;

        metrics::counter!("ledger_writes_total", "collection" => collection.to_string())
            .increment(1);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<LedgerFields>> {
        let row = sqlx::query(
            "SELECT fields FROM ledger_records WHERE collection = $1 AND record_key = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let value: serde_json::Value = row.try_get("fields")?;
                Ok(Some(serde_json::from_value(value)?))
            }
            None => Ok(None),
        }
    }

    async fn list_collections(&self, limit: usize) -> Result<Vec<String>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT collection FROM ledger_records ORDER BY collection ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
