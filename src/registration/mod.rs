//! User registration against Firebase Auth, Firestore and Cloud Storage

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod image_storage;
pub mod local;
pub mod memory;
pub mod notify;
pub mod orchestrator;
pub mod services;
pub mod user_directory;
pub mod user_info;
pub mod validation;

pub use auth::{FirebaseAuth, ServiceAccountTokens, StaticToken, TokenSource};
pub use backend::BackendKind;
pub use config::RegistrationConfig;
pub use error::{ProviderError, RegistrationError, ValidationError};
pub use image_storage::CloudImageStorage;
pub use local::{LocalFilePicker, LocalStoragePermission};
pub use memory::{InMemoryBackend, RemoteCall, Step};
pub use notify::{Level, LogNotifier, Notification, RecordingNotifier};
pub use orchestrator::{ImageUpload, Registered, Registrar, RegistrationSession, StorageLayout};
pub use services::{
    BlobStore, DocumentStore, FilePicker, IdentityProvider, ImageHandle, Notifier,
    PermissionService, PermissionStatus,
};
pub use user_directory::FirestoreDirectory;
pub use user_info::{RegistrationForm, UserId, UserProfile};
