use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "site.toml";
const DEFAULT_API_VERSION: &str = "2023-06-13";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONTENT_DIR: &str = "content";

/// Optional on-disk settings. Environment variables win over these.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct FileConfig {
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub site_url: Option<String>,
    pub api_version: Option<String>,
    pub use_cdn: Option<bool>,
    pub port: Option<u16>,
    pub content_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub project_id: String,
    pub dataset: String,
    /// Absolute base used for shareable links, without a trailing slash.
    pub site_url: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub port: u16,
    pub content_dir: PathBuf,
    pub is_development: bool,
}

impl SiteConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = read_file_config(Path::new(CONFIG_FILE))?;
        let config = Self::from_sources(file, |key| std::env::var(key).ok())?;
        info!(
            project = %config.project_id,
            dataset = %config.dataset,
            development = config.is_development,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = env("SANITY_PROJECT_ID")
            .or(file.project_id)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SANITY_PROJECT_ID"))?;
        let dataset = env("SANITY_DATASET")
            .or(file.dataset)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SANITY_DATASET"))?;
        let site_url = env("SITE_URL")
            .or(file.site_url)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let api_version = env("SANITY_API_VERSION")
            .or(file.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let use_cdn = match env("SANITY_USE_CDN") {
            Some(raw) => parse_bool("SANITY_USE_CDN", &raw)?,
            None => file.use_cdn.unwrap_or(true),
        };
        let port = match env("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };
        let content_dir = env("CONTENT_DIR")
            .map(PathBuf::from)
            .or(file.content_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
        let is_development = env("RUST_ENV").map_or(false, |v| v == "development");

        Ok(SiteConfig {
            project_id,
            dataset,
            site_url,
            api_version,
            use_cdn,
            port,
            content_dir,
            is_development,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        debug!("no {} found, using environment only", path.display());
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_only_applies_defaults() {
        let config = SiteConfig::from_sources(
            FileConfig::default(),
            env_from(&[
                ("SANITY_PROJECT_ID", "abc123"),
                ("SANITY_DATASET", "production"),
                ("SITE_URL", "https://example.com/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.project_id, "abc123");
        assert_eq!(config.site_url, "https://example.com");
        assert_eq!(config.api_version, "2023-06-13");
        assert!(config.use_cdn);
        assert_eq!(config.port, 8080);
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert!(!config.is_development);
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            project_id = "from-file"
            dataset = "staging"
            use_cdn = false
            port = 3000
            "#,
        )
        .unwrap();
        let config = SiteConfig::from_sources(
            file,
            env_from(&[("SANITY_PROJECT_ID", "from-env"), ("RUST_ENV", "development")]),
        )
        .unwrap();

        assert_eq!(config.project_id, "from-env");
        assert_eq!(config.dataset, "staging");
        assert!(!config.use_cdn);
        assert_eq!(config.port, 3000);
        assert!(config.is_development);
    }

    #[test]
    fn missing_project_is_an_error() {
        let err = SiteConfig::from_sources(
            FileConfig::default(),
            env_from(&[("SANITY_DATASET", "production")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SANITY_PROJECT_ID")));
    }

    #[test]
    fn rejects_bad_port_and_flag() {
        let base = [("SANITY_PROJECT_ID", "p"), ("SANITY_DATASET", "d")];

        let mut pairs = base.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = SiteConfig::from_sources(FileConfig::default(), env_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let mut pairs = base.to_vec();
        pairs.push(("SANITY_USE_CDN", "maybe"));
        let err = SiteConfig::from_sources(FileConfig::default(), env_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SANITY_USE_CDN", .. }));
    }
}
