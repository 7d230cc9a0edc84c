use anyhow::Result;
use staysync_core::config::SyncConfig;

/// Show what a sync would add, without writing anything.
pub async fn run(config: SyncConfig) -> Result<()> {
    super::sync::run(config, true).await
}
