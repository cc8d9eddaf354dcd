//! Guided out-of-box experience.
//!
//! This performs automatic setup for people running `satcheld`
//! directly without specifying any configurations. The generated
//! config provides guidance for a more permanent setup.
//!
//! Paths:
//! - Config: `~/.config/satchel/server.toml`
//! - SQLite: `~/.local/share/satchel/server.db`
//! - Coursework: `~/.local/share/satchel/storage`
//! - Exports: `~/.local/share/satchel/export`

use anyhow::{anyhow, Result};
use tokio::fs::{self, OpenOptions};

use crate::config;

const CONFIG_TEMPLATE: &str = include_str!("config-template.toml");

pub async fn run_oobe() -> Result<()> {
    let config_path = config::get_xdg_config_path()?;

    if config_path.exists() {
        return Ok(());
    }

    let data_path = config::get_xdg_data_path()?;
    let utf8 = |p: &std::path::Path| {
        p.to_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Path {:?} is not valid UTF-8", p))
    };

    // Generate a simple config
    let database_path = data_path.join("server.db");
    let database_url = format!("sqlite://{}", utf8(&database_path)?);
    OpenOptions::new()
        .create(true)
        .write(true)
        .open(&database_path)
        .await?;

    let storage_path = data_path.join("storage");
    fs::create_dir_all(&storage_path).await?;

    let export_path = data_path.join("export");
    fs::create_dir_all(&export_path).await?;

    let config_content = CONFIG_TEMPLATE
        .replace("%database_url%", &database_url)
        .replace("%storage_path%", &utf8(&storage_path)?)
        .replace("%export_path%", &utf8(&export_path)?);

    fs::write(&config_path, config_content.as_bytes()).await?;

    eprintln!();
    eprintln!("-------------------");
    eprintln!("Welcome to Satchel!");
    eprintln!();
    eprintln!("A simple setup using SQLite and local storage has been configured for you in:");
    eprintln!();
    eprintln!("    {}", utf8(&config_path)?);
    eprintln!();
    eprintln!("Coursework records and student profiles are read from the database.");
    eprintln!("Uploads are accepted at:");
    eprintln!();
    eprintln!("    http://localhost:8080/_api/v1/coursework/upload");
    eprintln!("-------------------");
    eprintln!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let content = CONFIG_TEMPLATE
            .replace("%database_url%", "sqlite:///tmp/server.db")
            .replace("%storage_path%", "/tmp/storage")
            .replace("%export_path%", "/tmp/export");

        let config = config::load_config_from_str(&content).unwrap();
        assert_eq!(8080, config.listen.port());
        assert_eq!(
            std::time::Duration::from_secs(12 * 3600),
            config.reconciliation.interval
        );
    }
}
