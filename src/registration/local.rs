//! File selection and storage permission for a process running on the user's machine

use crate::registration::services::{FilePicker, ImageHandle, PermissionService, PermissionStatus};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Picks the image the user named up front, if it exists.
#[derive(Debug, Clone, Default)]
pub struct LocalFilePicker {
    path: Option<PathBuf>,
}

impl LocalFilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FilePicker for LocalFilePicker {
    async fn pick(&self) -> Option<ImageHandle> {
        let path = self.path.as_ref()?;
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Some(ImageHandle::File(path.clone())),
            Ok(_) => {
                warn!("{} is not a file, no image selected", path.display());
                None
            }
            Err(e) => {
                warn!("Cannot select {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Grants read access when the storage root can be listed.
#[derive(Debug, Clone)]
pub struct LocalStoragePermission {
    root: PathBuf,
}

impl LocalStoragePermission {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl PermissionService for LocalStoragePermission {
    async fn request_storage_read(&self) -> PermissionStatus {
        match tokio::fs::read_dir(&self.root).await {
            Ok(_) => PermissionStatus::Granted,
            Err(e) => {
                debug!("storage read denied for {}: {}", self.root.display(), e);
                PermissionStatus::Denied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picker_returns_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("me.jpg");
        std::fs::write(&image, b"\xFF\xD8\xFF").unwrap();

        let picked = LocalFilePicker::new(Some(image.clone())).pick().await;
        assert_eq!(picked, Some(ImageHandle::File(image)));

        assert_eq!(LocalFilePicker::new(Some(dir.path().join("missing.jpg"))).pick().await, None);
        assert_eq!(LocalFilePicker::new(Some(dir.path().to_path_buf())).pick().await, None);
        assert_eq!(LocalFilePicker::new(None).pick().await, None);
    }

    #[tokio::test]
    async fn permission_follows_directory_access() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            LocalStoragePermission::new(dir.path()).request_storage_read().await,
            PermissionStatus::Granted
        );
        assert_eq!(
            LocalStoragePermission::new(dir.path().join("nope")).request_storage_read().await,
            PermissionStatus::Denied
        );
    }
}
