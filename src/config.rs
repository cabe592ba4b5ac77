//! Service configuration loaded from TOML

use crate::registration::{BackendKind, RegistrationConfig};
use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub backend: BackendKind,
    /// Directory the command line picker must be able to read
    pub storage_root: PathBuf,
    pub firebase: RegistrationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            backend: BackendKind::default(),
            storage_root: PathBuf::from("."),
            firebase: RegistrationConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`. A missing file falls back to defaults unless the caller
    /// asked for that file explicitly.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        let mut cfg = if path.exists() || required {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            Self::parse(&text).with_context(|| format!("parse config {}", path.display()))?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };
        cfg.firebase.apply_env();
        Ok(cfg)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("parse listen address {:?}", self.listen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.listen, "127.0.0.1:8080");
        assert_eq!(cfg.backend, BackendKind::Firebase);
        assert_eq!(cfg.firebase.users_collection, "users");
        assert_eq!(cfg.firebase.images_folder, "images");
    }

    #[test]
    fn full_file_parses() {
        let cfg = Config::parse(
            r#"
            listen = "0.0.0.0:9000"
            backend = "memory"
            storage_root = "/sdcard"

            [firebase]
            project_id = "demo"
            api_key = "key"
            storage_bucket = "demo.appspot.com"
            credentials_path = "sa.json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen_addr().unwrap().port(), 9000);
        assert_eq!(cfg.backend, BackendKind::Memory);
        assert_eq!(cfg.storage_root, PathBuf::from("/sdcard"));
        assert_eq!(cfg.firebase.project_id, "demo");
        assert_eq!(cfg.firebase.credentials_path, PathBuf::from("sa.json"));
        assert_eq!(cfg.firebase.identity_url, "https://identitytoolkit.googleapis.com");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Config::parse(r#"backend = "drive""#).is_err());
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::load(&path, false).is_ok());
        assert!(Config::load(&path, true).is_err());
    }

    #[test]
    fn bad_listen_address_is_reported() {
        let cfg = Config::parse(r#"listen = "not-an-addr""#).unwrap();
        assert!(cfg.listen_addr().is_err());
    }
}
