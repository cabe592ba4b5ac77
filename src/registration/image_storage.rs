//! Image storage for profile pictures
//! Structure: {images_folder}/{user_id}.jpg in the project's storage bucket

use crate::registration::config::RegistrationConfig;
use crate::registration::error::ProviderError;
use crate::registration::services::BlobStore;
use async_trait::async_trait;
use cloud_storage::Client;
use std::env;
use tracing::info;

pub const JPEG: &str = "image/jpeg";

/// `cloud_storage` reads its key from this variable on first use.
const SERVICE_ACCOUNT_VAR: &str = "SERVICE_ACCOUNT";

pub struct CloudImageStorage {
    client: Client,
    bucket: String,
}

impl CloudImageStorage {
    pub fn new(config: &RegistrationConfig) -> Self {
        point_at_credentials(config);
        info!("Image storage initialized with bucket: {}", config.storage_bucket);

        Self {
            client: Client::default(),
            bucket: config.storage_bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

// An explicit SERVICE_ACCOUNT wins over the configured credentials file.
fn point_at_credentials(config: &RegistrationConfig) {
    if env::var_os(SERVICE_ACCOUNT_VAR).is_none() {
        env::set_var(SERVICE_ACCOUNT_VAR, &config.credentials_path);
    }
}

#[async_trait]
impl BlobStore for CloudImageStorage {
    async fn upload_file(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ProviderError> {
        let size = bytes.len();

        self.client
            .object()
            .create(&self.bucket, bytes, path, content_type)
            .await
            .map_err(|e| ProviderError::new(format!("Failed to upload image: {}", e)))?;

        info!("Uploaded {} ({} bytes)", path, size);
        Ok(())
    }
}
