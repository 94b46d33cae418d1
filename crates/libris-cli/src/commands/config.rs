//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use libris_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "library_name": config.library_name,
                    "recent_log_limit": config.recent_log_limit,
                    "log_file": config.log_file,
                    "database": config.database_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  library_name:     {}", config.library_name);
            println!("  recent_log_limit: {}", config.recent_log_limit);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Database:    {}", config.database_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "library_name" => {
            if value.is_empty() {
                bail!("library_name must not be empty");
            }
            config.library_name = value.to_string();
        }
        "recent_log_limit" => {
            config.recent_log_limit = value
                .parse()
                .context("Invalid value for recent_log_limit. Use a positive number.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, library_name, recent_log_limit, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "library_name", "Campus Library").unwrap();
        apply(&mut config, "recent_log_limit", "50").unwrap();
        apply(&mut config, "log_file", "/tmp/libris.log").unwrap();

        assert_eq!(config.library_name, "Campus Library");
        assert_eq!(config.recent_log_limit, 50);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/libris.log")));

        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply(&mut config, "recent_log_limit", "many").is_err());
        assert!(apply(&mut config, "library_name", "").is_err());
        assert!(apply(&mut config, "sync_url", "ws://nowhere").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir.display().to_string())).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set(
            "library_name".to_string(),
            "Branch Library".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Branch Library"));
    }
}
