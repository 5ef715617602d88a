use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory with an initial `config.json` and an empty database.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/chargebook`
/// - `user` - The owning user to write into `config.json`. Defaults to `default`.
///
/// # Errors
/// - If the directory was already initialized.
/// - If any file operations fail.
pub async fn init(home: &Path, user: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(home, user)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the chargebook directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("cb");
        let out = init(&home, Some("ana")).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.user(), "ana");
    }
}
