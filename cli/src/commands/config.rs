//! Config command - show or initialise the configuration file.

use anyhow::{bail, Result};
use portscope_core::{Config, ConfigStore};

pub async fn run(store: &ConfigStore, config: &Config, init: bool, json: bool) -> Result<()> {
    if init {
        if store.exists() {
            bail!("Config file already exists at {}", store.path().display());
        }
        store.save(&Config::default()).await?;
        println!("Wrote default configuration to {}", store.path().display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Config file: {}", store.path().display());
    if !store.exists() {
        println!("  (not found, using defaults)");
    }
    println!();
    println!("Refresh interval:     {}s", config.refresh_interval().as_secs());
    println!("Notification timeout: {}s", config.notification_timeout);
    println!(
        "Initial filter:       {}",
        if config.ports_only { "Ports Only" } else { "All" }
    );
    println!(
        "Initial sort:         {} ({})",
        config.sort_key.display_name(),
        if config.sort_descending { "DESC" } else { "ASC" }
    );
    println!("Kill mode:            {:?}", config.kill_mode);
    println!("Grace period:         {}ms", config.grace_period_ms);

    Ok(())
}
