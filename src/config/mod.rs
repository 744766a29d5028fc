pub mod model;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::{ApiConfig, AppConfig, ProviderKind};

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mockme")
        .join("config.toml")
}

/// Load the config at `path` (defaults when the file is absent), then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config file")?
    } else {
        AppConfig::default()
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

fn apply_env(config: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("MOCKME_API_URL").filter(|v| !v.is_empty()) {
        config.api.base_url = url;
    }
    if let Some(id) = var("MOCKME_GOOGLE_CLIENT_ID").filter(|v| !v.is_empty()) {
        config.auth.google_client_id = id;
    }
    if let Some(secret) = var("MOCKME_GOOGLE_CLIENT_SECRET").filter(|v| !v.is_empty()) {
        config.auth.google_client_secret = secret;
    }
    if let Some(token) = var("MOCKME_ID_TOKEN").filter(|v| !v.is_empty()) {
        config.auth.credential = Some(token);
        config.auth.provider = ProviderKind::Static;
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.prefix, "/mockme");
        assert_eq!(config.ui.date_format, "%d/%m/%Y");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://quiz.example.com"

            [auth]
            provider = "static"
            credential = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://quiz.example.com");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.auth.provider, ProviderKind::Static);
        assert_eq!(config.auth.scopes, "openid email profile");
        assert!(config.logging.enabled);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mockme").join("config.toml");
        let mut config = AppConfig::default();
        config.api.base_url = "https://example.org".into();
        config.logging.level = "debug".into();
        save_config(&config, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn env_overrides() {
        let mut config = AppConfig::default();
        apply_env(&mut config, |key| match key {
            "MOCKME_API_URL" => Some("https://override".into()),
            "MOCKME_ID_TOKEN" => Some("id-token".into()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://override");
        assert_eq!(config.auth.provider, ProviderKind::Static);
        assert_eq!(config.auth.credential.as_deref(), Some("id-token"));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/log/x"), PathBuf::from("/var/log/x"));
    }
}
