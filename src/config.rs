use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where the pet backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Accept only absolute http(s) URLs as the backend base.
pub fn parse_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim()).with_context(|| format!("Invalid URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("Unsupported URL scheme: {}", other),
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Returns the petform config directory path (`~/.config/petform/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".config").join("petform"))
}

/// Returns the config file path (`~/.config/petform/config.toml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config from disk. Returns `Ok(None)` if the file does not exist.
pub fn load_config() -> Result<Option<AppConfig>> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content).context("Failed to parse config.toml")?;
    Ok(Some(config))
}

/// Write the config to disk, creating the directory if needed.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_serialization() {
        let config = AppConfig {
            api: ApiConfig {
                base_url: "https://pets.example.com".to_string(),
            },
            log: LogConfig {
                level: "debug".to_string(),
            },
        };
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.log.level, "debug");
    }

    #[test]
    fn log_level_defaults_when_omitted() {
        let minimal_toml = r#"
[api]
base_url = "http://localhost:3000"
"#;
        let config: AppConfig = toml::from_str(minimal_toml).expect("parse minimal config");
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn base_url_is_normalized_without_trailing_slash() {
        assert_eq!(
            parse_base_url(" http://localhost:3000/ ").expect("valid url"),
            "http://localhost:3000"
        );
        assert_eq!(
            parse_base_url("https://pets.example.com/app/").expect("valid url"),
            "https://pets.example.com/app"
        );
    }

    #[test]
    fn base_url_rejects_non_http_and_garbage() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("localhost").is_err());
        assert!(parse_base_url("").is_err());
    }
}
