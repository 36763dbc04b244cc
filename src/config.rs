use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use webhook_certs::Mode;

/// Defaults for `generate`, read from TOML. Command line flags win over these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertgenConfig {
    pub provider_name: String,
    /// Output directory; derived from the provider name when unset
    pub cert_dir: Option<PathBuf>,
    pub mode: Mode,
    pub url: String,
    pub namespace: String,
}

impl Default for CertgenConfig {
    fn default() -> Self {
        Self {
            provider_name: "local".into(),
            cert_dir: None,
            mode: Mode::Url,
            url: "localhost".into(),
            namespace: String::new(),
        }
    }
}

impl CertgenConfig {
    /// Load from `path`, or from the user config file if it exists.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg_path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let cfg_str = fs::read_to_string(&cfg_path)
            .with_context(|| format!("Failed to read config file {}", cfg_path.display()))?;
        let cfg: CertgenConfig = toml::from_str(&cfg_str)
            .with_context(|| format!("Failed to parse config {}", cfg_path.display()))?;

        log::info!("Using config from: {}", cfg_path.display());
        Ok(cfg)
    }

    /// Directory the server key pair is written to
    pub fn resolved_cert_dir(&self) -> PathBuf {
        self.cert_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("webhook-certs")
                .join(&self.provider_name)
        })
    }
}

/// `<config_dir>/webhook-certs/webhook-certs.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("webhook-certs").join("webhook-certs.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("webhook-certs.toml");
        fs::write(
            &path,
            "provider_name = \"provider-local\"\nmode = \"service\"\nnamespace = \"garden\"\n",
        )
        .unwrap();

        let cfg = CertgenConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(cfg.provider_name, "provider-local");
        assert_eq!(cfg.mode, Mode::Service);
        assert_eq!(cfg.namespace, "garden");
        assert_eq!(cfg.url, "localhost");
        assert!(cfg.cert_dir.is_none());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(CertgenConfig::load(Some(tmp.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "mode = \"cluster\"\n").unwrap();
        assert!(CertgenConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let cfg = CertgenConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CertgenConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn cert_dir_falls_back_to_provider_directory() {
        let cfg = CertgenConfig {
            provider_name: "provider-local".into(),
            ..Default::default()
        };
        let dir = cfg.resolved_cert_dir();
        assert!(dir.ends_with("webhook-certs/provider-local"));

        let explicit = CertgenConfig {
            cert_dir: Some(PathBuf::from("/tmp/explicit")),
            ..Default::default()
        };
        assert_eq!(explicit.resolved_cert_dir(), PathBuf::from("/tmp/explicit"));
    }
}
