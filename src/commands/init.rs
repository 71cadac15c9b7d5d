use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its backups subdirectory and an initial `config.json` with default
/// settings.
///
/// # Errors
/// - Returns an error if the directory is already initialized or if any file operation fails.
pub async fn init(daydash_home: &Path) -> Result<Out<()>> {
    let config = Config::create(daydash_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the daydash directory and config at {}",
        config.config_path().display()
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
        let home = dir.path().join("home");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("config.json"));
        assert!(Config::load(&home).await.is_ok());
        assert!(init(&home).await.is_err());
    }
}
