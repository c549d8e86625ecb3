use anyhow::Context;

use crate::config::AppConfig;
use crate::database::manager;

pub async fn handle() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let url = config.database_url()?;

    let pool = manager::connect(url, &config.database)
        .await
        .with_context(|| format!("failed to connect to {}", manager::redact_url(url)))?;
    manager::migrate(&pool).await.context("failed to apply schema")?;
    pool.close().await;

    println!("Schema is up to date");
    Ok(())
}
