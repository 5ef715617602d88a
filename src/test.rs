//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{ChargeInput, ChargeRecord, RecordId};
use crate::{utils, Config};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEST_USER: &str = "tester";

/// Test environment that sets up a chargebook home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("chargebook");
        let config = Config::create(&root, Some(TEST_USER)).await.unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory outside of the chargebook home.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` to a file in the scratch directory and returns its path.
    pub async fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        utils::write(&path, contents).await.unwrap();
        path
    }

    /// Inserts a non-exempt charge for the test user directly into the database.
    pub async fn insert(&self, date: &str, energy: &str, cost: &str, odometer: &str) -> RecordId {
        let input = ChargeInput {
            date: date.to_string(),
            energy: energy.parse().unwrap(),
            cost: cost.parse().unwrap(),
            exempt: false,
            odometer: odometer.parse().unwrap(),
            location: String::new(),
            notes: String::new(),
        };
        self.config
            .db()
            .insert_record(TEST_USER, &input)
            .await
            .unwrap()
    }

    /// All of the test user's records in chronological order.
    pub async fn records(&self) -> Vec<ChargeRecord> {
        self.config.db().fetch_records(TEST_USER).await.unwrap()
    }
}
