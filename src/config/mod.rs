mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./trackforge.toml",
        "~/.config/trackforge/config.toml",
        "/etc/trackforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.confirmation.timeout_secs == 0 {
        anyhow::bail!("Confirmation timeout cannot be 0");
    }

    if config.http.timeout_secs == 0 {
        anyhow::bail!("HTTP timeout cannot be 0");
    }

    if config.video.enabled {
        if config.video.api_url.is_empty() {
            anyhow::bail!("Video target '{}' is enabled but has no api_url", config.video.name);
        }
        if config.video.access_token.is_empty() {
            anyhow::bail!(
                "Video target '{}' is enabled but has no access token",
                config.video.name
            );
        }
        if !config.video.watch_url_template.contains("{id}") {
            anyhow::bail!("Video watch_url_template must contain {{id}}");
        }
    }

    if config.audio.enabled {
        if config.audio.api_url.is_empty() {
            anyhow::bail!("Audio target '{}' is enabled but has no api_url", config.audio.name);
        }
        if config.audio.access_token.is_empty() {
            anyhow::bail!(
                "Audio target '{}' is enabled but has no access token",
                config.audio.name
            );
        }
    }

    if let Some(ref site) = config.site {
        if site.url.is_empty() {
            anyhow::bail!("Site url cannot be empty");
        }
        if site.secret.is_empty() {
            anyhow::bail!("Site secret cannot be empty");
        }
    }

    Ok(())
}
