//! Configuration for the Firebase-backed registration services

use crate::registration::error::RegistrationError;
use crate::registration::orchestrator::StorageLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Service account JSON used for Firestore and Storage access
    pub credentials_path: PathBuf,
    pub project_id: String,
    /// Web API key for the Identity Toolkit endpoints
    pub api_key: String,
    pub storage_bucket: String,
    pub users_collection: String,
    pub images_folder: String,
    pub continue_uri: String,
    pub identity_url: String,
    pub firestore_url: String,
}

impl RegistrationConfig {
    pub fn new(
        project_id: impl Into<String>,
        api_key: impl Into<String>,
        storage_bucket: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            storage_bucket: storage_bucket.into(),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout {
            users_collection: self.users_collection.clone(),
            images_folder: self.images_folder.clone(),
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("FIREBASE_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("FIREBASE_PROJECT_ID") {
            self.project_id = v;
        }
        if let Some(v) = lookup("FIREBASE_BUCKET") {
            self.storage_bucket = v;
        }
        if let Some(v) = lookup("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_path = PathBuf::from(v);
        }
    }

    /// Checks the settings the remote services cannot do without.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let required = [
            ("project_id", &self.project_id),
            ("api_key", &self.api_key),
            ("storage_bucket", &self.storage_bucket),
            ("users_collection", &self.users_collection),
            ("images_folder", &self.images_folder),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(RegistrationError::ConfigError(format!(
                    "firebase.{} must be set",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials/service-account.json"),
            project_id: String::new(),
            api_key: String::new(),
            storage_bucket: String::new(),
            users_collection: "users".to_string(),
            images_folder: "images".to_string(),
            continue_uri: "http://localhost".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            firestore_url: "https://firestore.googleapis.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::user_info::UserId;
    use std::collections::HashMap;

    #[test]
    fn layout_follows_configured_names() {
        let cfg = RegistrationConfig {
            users_collection: "members".to_string(),
            images_folder: "avatars/".to_string(),
            ..RegistrationConfig::default()
        };
        let layout = cfg.layout();
        assert_eq!(layout.users_collection, "members");
        assert_eq!(layout.image_path(&UserId::new("abc")), "avatars/abc.jpg");
    }

    #[test]
    fn validate_requires_project_key_and_bucket() {
        let err = RegistrationConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("firebase.project_id"));

        let cfg = RegistrationConfig::new("demo", "key", "demo.appspot.com");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_requires_images_folder() {
        let cfg = RegistrationConfig {
            images_folder: "  ".to_string(),
            ..RegistrationConfig::new("demo", "key", "demo.appspot.com")
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("firebase.images_folder"));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            ("FIREBASE_API_KEY", "from-env"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/sa.json"),
        ]
        .into_iter()
        .collect();

        let mut cfg = RegistrationConfig::new("demo", "from-file", "demo.appspot.com");
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key, "from-env");
        assert_eq!(cfg.project_id, "demo");
        assert_eq!(cfg.credentials_path, PathBuf::from("/tmp/sa.json"));
    }
}
