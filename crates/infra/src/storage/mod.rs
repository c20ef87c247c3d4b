//! Durable key/value storage for the session credential.
//!
//! The session store and the gateway share one [`CredentialStore`]. The store is the
//! single source of truth for "can a session be resumed" at startup; nothing here knows
//! about HTTP.

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;
use tms_core::{TenantId, UserRecord};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Fixed storage keys.
pub mod keys {
    /// Bearer credential string.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// JSON-serialized user record.
    pub const USER: &str = "user";
    /// Tenant slug used for the `X-Tenant-ID` header.
    pub const TENANT_ID: &str = "tenant_id";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage document is corrupt: {0}")]
    Corrupt(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Synchronous string key/value store.
///
/// Reads and writes are expected to be fast and local; callers invoke them from async
/// code without offloading.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Typed view over the credential keys of a [`CredentialStore`].
///
/// Read failures degrade to "absent" (and are logged) so that a broken store behaves like
/// an empty one; write failures are returned.
pub struct PersistedSession<'a> {
    store: &'a dyn CredentialStore,
}

impl<'a> PersistedSession<'a> {
    pub fn new(store: &'a dyn CredentialStore) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        self.read(keys::ACCESS_TOKEN).filter(|t| !t.trim().is_empty())
    }

    /// Persisted tenant, or the default tenant when none is stored.
    pub fn tenant_id(&self) -> TenantId {
        self.read(keys::TENANT_ID)
            .map(TenantId::new)
            .unwrap_or_default()
    }

    /// Persisted user record. An unparseable record is treated as absent.
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.read(keys::USER)?;
        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable persisted user record");
                None
            }
        }
    }

    pub fn store_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::ACCESS_TOKEN, token)
    }

    /// Put the token back to a previously observed value (`None` removes it).
    pub fn restore_token(&self, previous: Option<&str>) -> Result<(), StorageError> {
        match previous {
            Some(token) => self.store.set(keys::ACCESS_TOKEN, token),
            None => self.store.remove(keys::ACCESS_TOKEN),
        }
    }

    pub fn store_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)
            .map_err(|e| StorageError::Corrupt(format!("cannot serialize user record: {e}")))?;
        self.store.set(keys::USER, &raw)
    }

    pub fn remove_user(&self) -> Result<(), StorageError> {
        self.store.remove(keys::USER)
    }

    pub fn store_tenant(&self, tenant_id: &TenantId) -> Result<(), StorageError> {
        self.store.set(keys::TENANT_ID, tenant_id.as_str())
    }

    /// Seed the tenant only if none has been persisted yet.
    pub fn seed_tenant(&self, tenant_id: &TenantId) -> Result<bool, StorageError> {
        if self.store.get(keys::TENANT_ID)?.is_some() {
            return Ok(false);
        }
        self.store_tenant(tenant_id)?;
        Ok(true)
    }

    /// Drop the credential and the user record. The tenant is kept.
    ///
    /// Both removals are attempted even if the first fails; the first error is returned.
    pub fn clear(&self) -> Result<(), StorageError> {
        let token = self.store.remove(keys::ACCESS_TOKEN);
        let user = self.store.remove(keys::USER);
        token.and(user)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "credential store read failed; treating as absent");
                None
            }
        }
    }
}
