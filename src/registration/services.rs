//! Collaborators the registration sequence drives
//!
//! The identity provider, document store and blob store are remote; the file
//! picker, permission service and notifier are local to the device or process
//! running the form.

use crate::registration::error::ProviderError;
use crate::registration::notify::Notification;
use crate::registration::user_info::{UserId, UserProfile};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// True when the provider already knows at least one sign-in method for
    /// `email`.
    async fn check_email_in_use(&self, email: &str) -> Result<bool, ProviderError>;

    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, ProviderError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates or fully replaces `collection/id`.
    async fn write_document(
        &self,
        collection: &str,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload_file(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ProviderError>;
}

/// Handle to an image chosen before submitting. Read at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHandle {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageHandle {
    pub async fn read(self) -> std::io::Result<Vec<u8>> {
        match self {
            ImageHandle::File(path) => tokio::fs::read(path).await,
            ImageHandle::Bytes(bytes) => Ok(bytes),
        }
    }
}

#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self) -> Option<ImageHandle>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn request_storage_read(&self) -> PermissionStatus;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
