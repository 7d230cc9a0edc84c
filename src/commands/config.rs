use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use staysync_core::config::SyncConfig;

pub fn run(config: &SyncConfig) -> Result<()> {
    let path = SyncConfig::config_path()?;
    let exists = if path.exists() { "" } else { " (not created)" };

    println!("{}{}", path.display(), exists.dimmed());
    println!();

    let rendered = toml::to_string_pretty(&config.redacted())
        .context("Could not render configuration")?;
    print!("{rendered}");

    if let Err(e) = config.validate() {
        println!();
        println!("{}", e.to_string().red());
    }

    Ok(())
}
