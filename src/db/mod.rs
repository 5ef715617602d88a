//! This module is responsible for reading, writing and managing the SQLite database. Every query is
//! scoped to a single owning user.
//!
//! Decimal values are stored as TEXT so that they come back exactly as they went in.

mod migrations;

use crate::model::{BaselineConfig, ChargeInput, ChargeRecord, Quantity, RecordId};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

const SELECT_CHARGES: &str = "SELECT id, user_id, date, energy, cost, exempt, odometer, location, \
    notes FROM charges";

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite connection pool
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The SQLite database is missing '{}'", path.display())
        }
        let pool = connect(path, false).await?;
        let _ = migrations::upgrade(&pool).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A file already exists at '{}'", path.display())
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        let version = migrations::upgrade(&pool).await?;
        debug!(
            "Created SQLite database at {} with schema version {version}",
            path.display()
        );
        Ok(Self { pool })
    }

    /// Returns all of `user`'s records in chronological order. Records on the same date keep their
    /// insertion order. Records whose date cannot be parsed come first, ordered by their raw text.
    pub(crate) async fn fetch_records(&self, user: &str) -> Result<Vec<ChargeRecord>> {
        let rows = sqlx::query(&format!("{SELECT_CHARGES} WHERE user_id = ? ORDER BY id"))
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch charge records")?;
        let mut records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;
        // Stored dates may use any accepted layout, so text order is not calendar order. The sort
        // is stable, which keeps same-day records in id order.
        records.sort_by(|a, b| chronological_key(a).cmp(&chronological_key(b)));
        trace!("Fetched {} records for user '{user}'", records.len());
        Ok(records)
    }

    /// Returns one record, or `None` if `id` does not exist or belongs to another user.
    pub(crate) async fn fetch_record(
        &self,
        user: &str,
        id: RecordId,
    ) -> Result<Option<ChargeRecord>> {
        let row = sqlx::query(&format!("{SELECT_CHARGES} WHERE user_id = ? AND id = ?"))
            .bind(user)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch charge record {id}"))?;
        row.as_ref().map(record_from_row).transpose()
    }

    /// Inserts a single record and returns its new id.
    pub(crate) async fn insert_record(&self, user: &str, input: &ChargeInput) -> Result<RecordId> {
        let result = insert_query(user, input)
            .execute(&self.pool)
            .await
            .context("Failed to insert charge record")?;
        Ok(RecordId::new(result.last_insert_rowid()))
    }

    /// Inserts every record in a single transaction. Either all of them are stored or none are.
    pub(crate) async fn insert_batch(
        &self,
        user: &str,
        inputs: &[ChargeInput],
    ) -> Result<Vec<RecordId>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin import transaction")?;
        let mut ids = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = insert_query(user, input)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert charge record dated {}", input.date))?;
            ids.push(RecordId::new(result.last_insert_rowid()));
        }
        tx.commit()
            .await
            .context("Failed to commit import transaction")?;
        debug!("Inserted {} records for user '{user}'", ids.len());
        Ok(ids)
    }

    /// Replaces every field of an existing record.
    ///
    /// # Errors
    /// - If `id` does not exist or is owned by another user.
    pub(crate) async fn update_record(
        &self,
        user: &str,
        id: RecordId,
        input: &ChargeInput,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE charges SET date = ?, energy = ?, cost = ?, exempt = ?, odometer = ?, \
            location = ?, notes = ? WHERE user_id = ? AND id = ?",
        )
        .bind(&input.date)
        .bind(input.energy.to_string())
        .bind(input.cost.to_string())
        .bind(input.exempt)
        .bind(input.odometer.to_string())
        .bind(&input.location)
        .bind(&input.notes)
        .bind(user)
        .bind(id.value())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update charge record {id}"))?;
        if result.rows_affected() == 0 {
            bail!("Charge record {id} not found")
        }
        Ok(())
    }

    /// Deletes one record.
    ///
    /// # Errors
    /// - If `id` does not exist or is owned by another user.
    pub(crate) async fn delete_record(&self, user: &str, id: RecordId) -> Result<()> {
        let result = sqlx::query("DELETE FROM charges WHERE user_id = ? AND id = ?")
            .bind(user)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete charge record {id}"))?;
        if result.rows_affected() == 0 {
            bail!("Charge record {id} not found")
        }
        Ok(())
    }

    /// The gasoline baseline for `user`, if one was ever set.
    pub(crate) async fn fetch_baseline(&self, user: &str) -> Result<Option<BaselineConfig>> {
        let row = sqlx::query("SELECT fuel_price, fuel_efficiency FROM baselines WHERE user_id = ?")
            .bind(user)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch the baseline")?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(BaselineConfig::new(
            decimal_column(&row, "fuel_price")?,
            decimal_column(&row, "fuel_efficiency")?,
        )))
    }

    /// Sets the gasoline baseline for `user`, replacing any previous one.
    pub(crate) async fn upsert_baseline(&self, user: &str, baseline: &BaselineConfig) -> Result<()> {
        sqlx::query(
            "INSERT INTO baselines (user_id, fuel_price, fuel_efficiency) VALUES (?, ?, ?) \
            ON CONFLICT(user_id) DO UPDATE SET fuel_price = excluded.fuel_price, \
            fuel_efficiency = excluded.fuel_efficiency",
        )
        .bind(user)
        .bind(baseline.fuel_price.to_string())
        .bind(baseline.fuel_efficiency.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save the baseline")?;
        Ok(())
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at {}", path.display()))
}

fn insert_query<'q>(
    user: &'q str,
    input: &'q ChargeInput,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    sqlx::query(
        "INSERT INTO charges (user_id, date, energy, cost, exempt, odometer, location, notes) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user)
    .bind(&input.date)
    .bind(input.energy.to_string())
    .bind(input.cost.to_string())
    .bind(input.exempt)
    .bind(input.odometer.to_string())
    .bind(&input.location)
    .bind(&input.notes)
}

fn record_from_row(row: &SqliteRow) -> Result<ChargeRecord> {
    let quantity = |column: &str| -> Result<Quantity> {
        let raw: String = row.try_get(column)?;
        Quantity::from_str(&raw).with_context(|| format!("Corrupt {column} value '{raw}'"))
    };
    let input = ChargeInput {
        date: row.try_get("date")?,
        energy: quantity("energy")?,
        cost: quantity("cost")?,
        exempt: row.try_get("exempt")?,
        odometer: quantity("odometer")?,
        location: row.try_get("location")?,
        notes: row.try_get("notes")?,
    };
    let id: i64 = row.try_get("id")?;
    let user: String = row.try_get("user_id")?;
    Ok(ChargeRecord::new(Some(RecordId::new(id)), user, input))
}

/// Parsed date first, with the raw text ordering records whose date cannot be parsed.
fn chronological_key(record: &ChargeRecord) -> (Option<NaiveDate>, &str) {
    match record.parsed_date() {
        Some(date) => (Some(date), ""),
        None => (None, record.date()),
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).with_context(|| format!("Corrupt {column} value '{raw}'"))
}
