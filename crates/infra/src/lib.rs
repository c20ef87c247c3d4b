//! Infrastructure layer: durable credential storage.

pub mod storage;

pub use storage::{
    CredentialStore, FileStore, MemoryStore, PersistedSession, StorageError, keys,
};
