use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::types::SiteKind;

pub const DEFAULT_API_BASE: &str = "http://localhost:8787";

/// Environment override for the mock API base address, checked once at startup.
pub const API_BASE_ENV: &str = "FORECOURT_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_site_kind")]
    pub kind: SiteKind,
}

fn default_site_kind() -> SiteKind {
    SiteKind::Fuel
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_refresh")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,
}

fn default_refresh() -> u64 {
    crate::refresh::POLL_INTERVAL.as_secs()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            id: "holiday-3851".into(),
            name: "Holiday 3851 - Lakeville".into(),
            company: "DY Holdings LLC".into(),
            address: Some("16255 Ipava Ave, Lakeville, MN 55044".into()),
            kind: SiteKind::Fuel,
        },
        SiteConfig {
            id: "inout-743-century".into(),
            name: "In-N-Out Market".into(),
            company: "JRD Companies Maplewood".into(),
            address: None,
            kind: SiteKind::Fuel,
        },
        SiteConfig {
            id: "auto-2727".into(),
            name: "Durand Automotive".into(),
            company: "JRD Auto Maplewood".into(),
            address: None,
            kind: SiteKind::Auto,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh(),
            api_base: default_api_base(),
            theme: default_theme(),
            sites: default_sites(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let mut cfg: Config = serde_yaml::from_str(&contents)?;
            cfg.clamp();
            Ok(cfg)
        } else {
            let cfg = Config::default();
            cfg.save()?;
            Ok(cfg)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)?;
        Ok(())
    }

    pub fn clamp(&mut self) {
        if self.refresh_interval_secs < 60 {
            self.refresh_interval_secs = 60;
        }
        if self.sites.is_empty() {
            self.sites = default_sites();
        }
    }

    /// Base address for the mock API, resolved once at process start:
    /// environment override, then CLI flag, then config, then local default.
    pub fn resolve_api_base(&self, cli_override: Option<&str>) -> String {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.is_empty() {
                return base;
            }
        }
        if let Some(base) = cli_override {
            return base.to_string();
        }
        self.api_base.clone()
    }

    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("forecourt");
        path.push("config.yaml");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("theme: light\n").unwrap();
        assert_eq!(cfg.theme, "light");
        assert_eq!(cfg.refresh_interval_secs, 600);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.sites.len(), 3);
        assert_eq!(cfg.sites[0].id, "holiday-3851");
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let mut cfg: Config = serde_yaml::from_str("refresh_interval_secs: 5\n").unwrap();
        cfg.clamp();
        assert_eq!(cfg.refresh_interval_secs, 60);
    }

    #[test]
    fn site_kind_defaults_to_fuel() {
        let yaml = "sites:\n  - id: x-1\n    name: X\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.sites[0].kind, SiteKind::Fuel);
    }

    #[test]
    fn cli_override_beats_config() {
        let cfg = Config::default();
        // Env var unset in tests; CLI flag wins over the config value.
        assert_eq!(
            cfg.resolve_api_base(Some("http://10.0.0.2:8787")),
            "http://10.0.0.2:8787"
        );
        assert_eq!(cfg.resolve_api_base(None), DEFAULT_API_BASE);
    }
}
