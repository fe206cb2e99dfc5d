//! AstroVision configuration: defaults, then an optional `astrovision.toml`, then environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | ASTROVISION_CONFIG | astrovision.toml | Path of the optional TOML file. |
//! | ASTROVISION_BIND_ADDR | 127.0.0.1:3000 | Gateway listen address. |
//! | NASA_API_KEY / NEXT_PUBLIC_NASA_API_KEY | DEMO_KEY | Key for DONKI and NeoWs. |
//! | OPENAI_API_KEY | (unset) | Bearer key for the completion API; relay answers 500 without it. |
//! | ASTROVISION_COMPLETION_URL | https://api.openai.com/v1/chat/completions | OpenAI-compatible endpoint. |
//! | ASTROVISION_COMPLETION_MODEL | gpt-3.5-turbo | Fixed model id for every relayed prompt. |
//! | ASTROVISION_HTTP_TIMEOUT_SECS | 30 | Upstream request timeout, clamped to 1..=300. |
//! | ASTROVISION_NEO_START / ASTROVISION_NEO_END | 2025-02-01 / 2025-02-07 | Default asteroid date range. |
//! | ASTROVISION_RELAY_URL | http://127.0.0.1:3000/api/chat | Where chat clients post messages. |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "astrovision.toml";
pub const DEMO_NASA_KEY: &str = "DEMO_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upstream base URLs, one per feed. Query parameters are added by the adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedEndpoints {
    pub iss: String,
    pub launches: String,
    pub spacex: String,
    pub kp_index: String,
    pub solar_flares: String,
    pub asteroids: String,
    pub news: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            iss: "http://api.open-notify.org/iss-now.json".to_string(),
            launches: "https://ll.thespacedevs.com/2.3.0/launch/upcoming/".to_string(),
            spacex: "https://api.spacexdata.com/v4/launches".to_string(),
            kp_index: "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json".to_string(),
            solar_flares: "https://api.nasa.gov/DONKI/FLR".to_string(),
            asteroids: "https://api.nasa.gov/neo/rest/v1/feed".to_string(),
            news: "https://api.spaceflightnewsapi.net/v4/articles".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstroConfig {
    pub bind_addr: String,
    pub nasa_api_key: String,
    pub openai_api_key: Option<String>,
    pub completion_url: String,
    pub completion_model: String,
    pub http_timeout_secs: u64,
    pub neo_start: String,
    pub neo_end: String,
    pub relay_url: String,
    pub feeds: FeedEndpoints,
}

impl Default for AstroConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            nasa_api_key: DEMO_NASA_KEY.to_string(),
            openai_api_key: None,
            completion_url: "https://api.openai.com/v1/chat/completions".to_string(),
            completion_model: "gpt-3.5-turbo".to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            neo_start: "2025-02-01".to_string(),
            neo_end: "2025-02-07".to_string(),
            relay_url: "http://127.0.0.1:3000/api/chat".to_string(),
            feeds: FeedEndpoints::default(),
        }
    }
}

impl AstroConfig {
    /// Path of the config file: `ASTROVISION_CONFIG` or `astrovision.toml`.
    pub fn default_path() -> PathBuf {
        env_opt_string("ASTROVISION_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Defaults, overlaid by the config file (if present), overlaid by the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(&Self::default_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Read the TOML file at `path`. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(target: "astrovision::config", path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AstroConfig = toml::from_str(&content)?;
        tracing::info!(target: "astrovision::config", path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Overlay values from a variable lookup. Blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("ASTROVISION_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("NASA_API_KEY").or_else(|| get("NEXT_PUBLIC_NASA_API_KEY")) {
            self.nasa_api_key = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = get("ASTROVISION_COMPLETION_URL") {
            self.completion_url = v;
        }
        if let Some(v) = get("ASTROVISION_COMPLETION_MODEL") {
            self.completion_model = v;
        }
        if let Some(v) = get("ASTROVISION_HTTP_TIMEOUT_SECS") {
            match v.trim().parse() {
                Ok(secs) => self.http_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    target: "astrovision::config",
                    value = %v,
                    kept = self.http_timeout_secs,
                    "ignoring malformed ASTROVISION_HTTP_TIMEOUT_SECS"
                ),
            }
        }
        if let Some(v) = get("ASTROVISION_NEO_START") {
            self.neo_start = v;
        }
        if let Some(v) = get("ASTROVISION_NEO_END") {
            self.neo_end = v;
        }
        if let Some(v) = get("ASTROVISION_RELAY_URL") {
            self.relay_url = v;
        }
        self.http_timeout_secs = self.http_timeout_secs.clamp(1, 300);
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.clamp(1, 300))
    }

    /// The OpenAI key, if configured and non-blank.
    pub fn completion_api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = AstroConfig::load_from_path(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg, AstroConfig::default());
        assert_eq!(cfg.nasa_api_key, DEMO_NASA_KEY);
    }

    #[test]
    fn file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("astrovision.toml");
        std::fs::write(
            &path,
            "completion_model = \"gpt-4o-mini\"\n[feeds]\nnews = \"http://localhost:9999/articles\"\n",
        )
        .expect("write");
        let cfg = AstroConfig::load_from_path(&path).expect("load");
        assert_eq!(cfg.completion_model, "gpt-4o-mini");
        assert_eq!(cfg.feeds.news, "http://localhost:9999/articles");
        assert_eq!(cfg.feeds.iss, FeedEndpoints::default().iss);
        assert_eq!(cfg.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "http_timeout_secs = \"soon\"").expect("write");
        assert!(matches!(
            AstroConfig::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overlay_and_fallback_key() {
        let mut cfg = AstroConfig::default();
        cfg.apply_env_with(lookup(&[
            ("NEXT_PUBLIC_NASA_API_KEY", "abc123"),
            ("OPENAI_API_KEY", "  "),
            ("ASTROVISION_HTTP_TIMEOUT_SECS", "9000"),
        ]));
        assert_eq!(cfg.nasa_api_key, "abc123");
        assert_eq!(cfg.openai_api_key, None);
        assert_eq!(cfg.http_timeout_secs, 300);
        assert!(cfg.completion_api_key().is_none());
    }

    #[test]
    fn primary_nasa_key_wins() {
        let mut cfg = AstroConfig::default();
        cfg.apply_env_with(lookup(&[
            ("NASA_API_KEY", "primary"),
            ("NEXT_PUBLIC_NASA_API_KEY", "legacy"),
        ]));
        assert_eq!(cfg.nasa_api_key, "primary");
    }

    #[test]
    fn malformed_timeout_keeps_the_loaded_value() {
        let mut cfg = AstroConfig::default();
        cfg.apply_env_with(lookup(&[("ASTROVISION_HTTP_TIMEOUT_SECS", "thirty")]));
        assert_eq!(cfg.http_timeout_secs, DEFAULT_TIMEOUT_SECS);

        let mut cfg = AstroConfig {
            http_timeout_secs: 12,
            ..AstroConfig::default()
        };
        cfg.apply_env_with(lookup(&[("ASTROVISION_HTTP_TIMEOUT_SECS", "-5")]));
        assert_eq!(cfg.http_timeout_secs, 12);
    }

}
