//! The registration sequence
//!
//! validate -> check email -> create account -> save profile -> upload image
//!
//! Each remote step is awaited before the next one is issued. Steps one to
//! three abort the attempt on failure; the image upload is reported on its
//! own and never undoes the saved profile.

use crate::registration::error::{RegistrationError, ValidationError};
use crate::registration::image_storage::JPEG;
use crate::registration::notify::Notification;
use crate::registration::services::{
    BlobStore, DocumentStore, FilePicker, IdentityProvider, ImageHandle, Notifier,
    PermissionService, PermissionStatus,
};
use crate::registration::user_info::{RegistrationForm, UserId};
use crate::registration::validation;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const EMAIL_CHECK_FAILED: &str = "Failed to check email availability.";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed.";
pub const SAVE_FAILED: &str = "Error saving user data.";
pub const PROFILE_SAVED: &str = "User data saved.";
pub const IMAGE_UPLOADED: &str = "Image uploaded.";
pub const IMAGE_UPLOAD_FAILED: &str = "Image upload failed.";
pub const PERMISSION_DENIED: &str = "Permission denied. Cannot access storage.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageUpload {
    NotSelected,
    Uploaded { path: String },
    Failed { message: String },
}

/// A completed registration: the account exists and its profile is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub user_id: UserId,
    pub image: ImageUpload,
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub users_collection: String,
    pub images_folder: String,
}

impl StorageLayout {
    pub fn image_path(&self, user_id: &UserId) -> String {
        format!("{}/{}.jpg", self.images_folder.trim_end_matches('/'), user_id)
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            users_collection: "users".to_string(),
            images_folder: "images".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Registrar {
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    layout: StorageLayout,
}

impl Registrar {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            identity,
            documents,
            blobs,
            layout: StorageLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: StorageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Runs one attempt. Every outcome the user should see goes through
    /// `notifier`; an `Err` has already been reported there.
    pub async fn register(
        &self,
        form: RegistrationForm,
        image: Option<ImageHandle>,
        notifier: &dyn Notifier,
    ) -> Result<Registered, RegistrationError> {
        if let Err(e) = validation::validate(&form) {
            return Err(reject(notifier, e));
        }

        let in_use = match self.identity.check_email_in_use(&form.email).await {
            Ok(in_use) => in_use,
            Err(e) => {
                return Err(abort(
                    notifier,
                    RegistrationError::EmailCheckFailed(e.message_or(EMAIL_CHECK_FAILED)),
                ))
            }
        };
        if in_use {
            return Err(abort(notifier, RegistrationError::EmailAlreadyRegistered));
        }

        let user_id = match self.identity.create_account(&form.email, &form.password).await {
            Ok(id) => id,
            Err(e) => {
                return Err(abort(
                    notifier,
                    RegistrationError::AccountCreationFailed(e.message_or(AUTHENTICATION_FAILED)),
                ))
            }
        };
        info!("Created account {} for {}", user_id, form.email);

        let profile = form.profile();
        if let Err(e) = self
            .documents
            .write_document(&self.layout.users_collection, &user_id, &profile)
            .await
        {
            // The account stays; a later attempt with the same email will
            // report it as already registered.
            return Err(abort(
                notifier,
                RegistrationError::ProfileSaveFailed(e.message_or(SAVE_FAILED)),
            ));
        }
        info!("Saved profile for user '{}' ({})", profile.username, user_id);
        notifier.notify(Notification::success(PROFILE_SAVED));

        let image = match image {
            Some(handle) => self.upload_image(&user_id, handle, notifier).await,
            None => ImageUpload::NotSelected,
        };

        Ok(Registered { user_id, image })
    }

    async fn upload_image(
        &self,
        user_id: &UserId,
        handle: ImageHandle,
        notifier: &dyn Notifier,
    ) -> ImageUpload {
        let path = self.layout.image_path(user_id);

        let result = match handle.read().await {
            Ok(bytes) => self
                .blobs
                .upload_file(&path, bytes, JPEG)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("Failed to read selected image: {}", e)),
        };

        match result {
            Ok(()) => {
                info!("Image uploaded to {}", path);
                notifier.notify(Notification::success(IMAGE_UPLOADED));
                ImageUpload::Uploaded { path }
            }
            Err(message) => {
                error!("Error uploading image to {}: {}", path, message);
                notifier.notify(Notification::error(IMAGE_UPLOAD_FAILED));
                ImageUpload::Failed { message }
            }
        }
    }
}

fn reject(notifier: &dyn Notifier, err: ValidationError) -> RegistrationError {
    warn!("Registration rejected: {}", err);
    notifier.notify(Notification::warning(err.to_string()));
    err.into()
}

fn abort(notifier: &dyn Notifier, err: RegistrationError) -> RegistrationError {
    warn!("Registration aborted: {}", err);
    notifier.notify(Notification::error(err.to_string()));
    err
}

/// State held by one open registration screen: whether storage may be read,
/// and the image picked for the next submission.
pub struct RegistrationSession {
    registrar: Registrar,
    picker: Arc<dyn FilePicker>,
    notifier: Arc<dyn Notifier>,
    storage: PermissionStatus,
    image: Option<ImageHandle>,
}

impl RegistrationSession {
    /// Asks for storage access up front. A refusal is reported but the form
    /// stays usable without an image.
    pub async fn open(
        registrar: Registrar,
        permissions: &dyn PermissionService,
        picker: Arc<dyn FilePicker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let storage = permissions.request_storage_read().await;
        if !storage.is_granted() {
            warn!("Storage permission denied");
            notifier.notify(Notification::warning(PERMISSION_DENIED));
        }
        Self {
            registrar,
            picker,
            notifier,
            storage,
            image: None,
        }
    }

    pub fn storage_access(&self) -> PermissionStatus {
        self.storage
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Returns whether an image is now selected.
    pub async fn select_image(&mut self) -> bool {
        if !self.storage.is_granted() {
            self.notifier.notify(Notification::warning(PERMISSION_DENIED));
            return false;
        }
        if let Some(handle) = self.picker.pick().await {
            self.image = Some(handle);
        }
        self.image.is_some()
    }

    /// Submits the form. The selected image belongs to this attempt only.
    pub async fn submit(&mut self, form: RegistrationForm) -> Result<Registered, RegistrationError> {
        let image = self.image.take();
        self.registrar
            .register(form, image, self.notifier.as_ref())
            .await
    }
}
