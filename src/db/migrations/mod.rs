//! Schema migrations. The schema only ever moves forward.
//!
//! Each `migration_NN_up.sql` takes the schema from version `NN-1` to `NN`. The version a database
//! is at lives in the single-row `schema_version` table.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::{debug, info};

use crate::Result;

/// Migration SQL in order. The migration at index `i` produces schema version `i + 1`.
const MIGRATIONS: &[&str] = &[include_str!("migration_01_up.sql")];

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

/// Creates the `schema_version` table of a brand new database, at version 0.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        "CREATE TABLE schema_version (version INTEGER NOT NULL);
         INSERT INTO schema_version (version) VALUES (0);",
    )
    .await
    .context("Failed to create schema_version table")?;
    Ok(())
}

pub(crate) async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0)
}

/// Applies every migration the database has not seen yet and returns the resulting version.
///
/// # Errors
/// - If the database was written by a newer program, with a version above `CURRENT_VERSION`.
/// - If a migration fails. That migration is rolled back, earlier ones stay applied.
pub(crate) async fn upgrade(pool: &SqlitePool) -> Result<i32> {
    let from = schema_version(pool).await?;
    if from > CURRENT_VERSION {
        bail!(
            "The database schema is at version {from} but this program only understands up to \
            version {CURRENT_VERSION}"
        )
    }
    if from == CURRENT_VERSION {
        debug!("Database schema is current at version {from}");
        return Ok(from);
    }

    for (version, sql) in (1..).zip(MIGRATIONS.iter()).skip(from.max(0) as usize) {
        apply(pool, version, sql).await?;
    }
    info!("Upgraded database schema from version {from} to {CURRENT_VERSION}");
    Ok(CURRENT_VERSION)
}

/// Runs one migration and records its version in the same transaction.
async fn apply(pool: &SqlitePool, version: i32, sql: &str) -> Result<()> {
    debug!("Applying migration {version:02}");
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;
    tx.execute(sql)
        .await
        .with_context(|| format!("Migration {version:02} failed"))?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;
    tx.commit()
        .await
        .with_context(|| format!("Failed to commit migration {version:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn fresh_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        bootstrap(&pool).await.unwrap();
        (dir, pool)
    }

    async fn tables(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_as::<_, (String,)>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
            ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|(name,)| name)
        .collect()
    }

    #[tokio::test]
    async fn test_upgrade_from_empty_schema() {
        let (_dir, pool) = fresh_pool().await;
        assert_eq!(schema_version(&pool).await.unwrap(), 0);

        assert_eq!(upgrade(&pool).await.unwrap(), CURRENT_VERSION);
        assert_eq!(schema_version(&pool).await.unwrap(), CURRENT_VERSION);
        assert_eq!(
            tables(&pool).await,
            vec!["baselines", "charges", "schema_version"]
        );
    }

    #[tokio::test]
    async fn test_upgrade_twice_is_a_no_op() {
        let (_dir, pool) = fresh_pool().await;
        let _ = upgrade(&pool).await.unwrap();
        assert_eq!(upgrade(&pool).await.unwrap(), CURRENT_VERSION);
        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows.0, 1);
    }

    #[tokio::test]
    async fn test_upgrade_refuses_newer_schema() {
        let (_dir, pool) = fresh_pool().await;
        sqlx::query("UPDATE schema_version SET version = ?")
            .bind(CURRENT_VERSION + 1)
            .execute(&pool)
            .await
            .unwrap();
        let err = upgrade(&pool).await.unwrap_err();
        assert!(err.to_string().contains("only understands"));
        assert_eq!(tables(&pool).await, vec!["schema_version"]);
    }

    #[tokio::test]
    async fn test_charges_defaults() {
        let (_dir, pool) = fresh_pool().await;
        let _ = upgrade(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO charges (user_id, date, energy, cost, odometer) \
            VALUES ('u', '2024-01-01', '10.50', '0', '1000')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let row: (String, i64, String, String) =
            sqlx::query_as("SELECT energy, exempt, location, notes FROM charges")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(row, (String::from("10.50"), 0, String::new(), String::new()));
    }

    #[test]
    fn test_current_version_matches_migrations() {
        assert_eq!(CURRENT_VERSION, 1);
        assert!(MIGRATIONS.iter().all(|sql| !sql.trim().is_empty()));
    }
}
