//! Wires a `Registrar` to either Firebase or the in-memory services

use crate::registration::auth::{FirebaseAuth, ServiceAccountTokens, TokenSource};
use crate::registration::config::RegistrationConfig;
use crate::registration::error::RegistrationError;
use crate::registration::http;
use crate::registration::image_storage::CloudImageStorage;
use crate::registration::memory::InMemoryBackend;
use crate::registration::orchestrator::Registrar;
use crate::registration::user_directory::FirestoreDirectory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Firebase,
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Firebase => write!(f, "firebase"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

pub async fn firebase(config: &RegistrationConfig) -> Result<Registrar, RegistrationError> {
    config.validate()?;

    let client = http::build_client();
    let tokens: Arc<dyn TokenSource> =
        Arc::new(ServiceAccountTokens::from_credentials(&config.credentials_path).await?);

    let identity = Arc::new(FirebaseAuth::new(client.clone(), config));
    let documents = Arc::new(FirestoreDirectory::new(client, tokens, config));
    let blobs = Arc::new(CloudImageStorage::new(config));

    info!(
        "Firebase backend ready (project {}, bucket {})",
        config.project_id, config.storage_bucket
    );
    Ok(Registrar::new(identity, documents, blobs).with_layout(config.layout()))
}

pub fn in_memory(backend: Arc<InMemoryBackend>, config: &RegistrationConfig) -> Registrar {
    info!("In-memory backend ready; nothing is persisted");
    Registrar::new(backend.clone(), backend.clone(), backend).with_layout(config.layout())
}

pub async fn build(
    kind: BackendKind,
    config: &RegistrationConfig,
) -> Result<Registrar, RegistrationError> {
    match kind {
        BackendKind::Firebase => firebase(config).await,
        BackendKind::Memory => Ok(in_memory(Arc::new(InMemoryBackend::new()), config)),
    }
}
