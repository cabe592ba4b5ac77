//! In-memory identity, document and blob services for development and tests

use crate::registration::error::ProviderError;
use crate::registration::services::{BlobStore, DocumentStore, IdentityProvider};
use crate::registration::user_info::{UserId, UserProfile};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Remote operations, in the order they were issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    CheckEmail(String),
    CreateAccount(String),
    WriteDocument { collection: String, id: String },
    UploadFile { path: String, size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CheckEmail,
    CreateAccount,
    WriteDocument,
    UploadFile,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    calls: Mutex<Vec<RemoteCall>>,
    accounts: Mutex<HashMap<String, UserId>>,
    documents: Mutex<HashMap<(String, String), UserProfile>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    faults: Mutex<HashMap<Step, ProviderError>>,
    next_id: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `email` as if an account already existed for it.
    pub fn seed_account(&self, email: &str) -> UserId {
        let id = self.allocate_id();
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(email.to_string(), id.clone());
        }
        id
    }

    /// Makes every later call of `step` fail. `None` means the failure
    /// carries no message.
    pub fn fail(&self, step: Step, message: Option<&str>) {
        let err = match message {
            Some(m) => ProviderError::new(m),
            None => ProviderError::silent(),
        };
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(step, err);
        }
    }

    pub fn heal(&self, step: Step) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.remove(&step);
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, step: Step) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    (step, call),
                    (Step::CheckEmail, RemoteCall::CheckEmail(_))
                        | (Step::CreateAccount, RemoteCall::CreateAccount(_))
                        | (Step::WriteDocument, RemoteCall::WriteDocument { .. })
                        | (Step::UploadFile, RemoteCall::UploadFile { .. })
                )
            })
            .count()
    }

    pub fn account(&self, email: &str) -> Option<UserId> {
        self.accounts.lock().ok()?.get(email).cloned()
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<UserProfile> {
        self.documents
            .lock()
            .ok()?
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path).cloned()
    }

    fn allocate_id(&self) -> UserId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        UserId::new(format!("u{}", n))
    }

    fn record(&self, call: RemoteCall) {
        debug!("in-memory backend: {:?}", call);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn fault(&self, step: Step) -> Result<(), ProviderError> {
        let fault = self.faults.lock().ok().and_then(|f| f.get(&step).cloned());
        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn check_email_in_use(&self, email: &str) -> Result<bool, ProviderError> {
        self.record(RemoteCall::CheckEmail(email.to_string()));
        self.fault(Step::CheckEmail)?;
        Ok(self.account(email).is_some())
    }

    async fn create_account(&self, email: &str, _password: &str) -> Result<UserId, ProviderError> {
        self.record(RemoteCall::CreateAccount(email.to_string()));
        self.fault(Step::CreateAccount)?;

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| ProviderError::new("Account table is unavailable"))?;
        match accounts.entry(email.to_string()) {
            Entry::Occupied(_) => Err(ProviderError::new(
                "The email address is already in use by another account.",
            )),
            Entry::Vacant(slot) => Ok(slot.insert(self.allocate_id()).clone()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn write_document(
        &self,
        collection: &str,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<(), ProviderError> {
        self.record(RemoteCall::WriteDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self.fault(Step::WriteDocument)?;

        if let Ok(mut documents) = self.documents.lock() {
            documents.insert((collection.to_string(), id.to_string()), profile.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBackend {
    async fn upload_file(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ProviderError> {
        self.record(RemoteCall::UploadFile {
            path: path.to_string(),
            size: bytes.len(),
        });
        self.fault(Step::UploadFile)?;

        if let Ok(mut files) = self.files.lock() {
            files.insert(path.to_string(), bytes);
        }
        Ok(())
    }
}
