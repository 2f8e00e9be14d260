//! Persistence bridge between the credential store and per-tab storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! A full page reload wipes the in-memory store. The bridge keeps the user's
//! name and role in per-tab storage (`sessionStorage` in the browser) so the
//! UI can show them again right away; the access token is never written and
//! is always re-acquired through the refresh exchange.
//!
//! TRADE-OFFS
//! ==========
//! Storage failures are not fatal. The first failure is logged and the bridge
//! stops touching storage for the rest of the process, which behaves like a
//! fresh, unauthenticated session on every load.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::credential::{CredentialPatch, Identity};
use crate::error::SessionError;
use crate::store::{CredentialStore, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("no storage backend: {0}")]
    Unavailable(String),
    #[error("storage rejected the operation: {0}")]
    Rejected(String),
}

/// Key/value storage that survives a reload within the same tab.
pub trait IdentityStorage {
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be reached.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be reached or is full.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be reached.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage held in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl IdentityStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage that refuses every operation (server rendering, private mode).
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStorage;

impl IdentityStorage for UnavailableStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage is not available here".to_owned()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is not available here".to_owned()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is not available here".to_owned()))
    }
}

struct BridgeInner {
    storage: Rc<dyn IdentityStorage>,
    key: String,
    store: CredentialStore,
    restored: Cell<bool>,
    degraded: Cell<bool>,
    last_written: RefCell<Option<Identity>>,
    mirror: RefCell<Option<Subscription>>,
}

/// Mirrors the store's identity into storage and restores it once.
#[derive(Clone)]
pub struct PersistenceBridge {
    inner: Rc<BridgeInner>,
}

impl PersistenceBridge {
    /// Create the bridge and attach it to `store`.
    ///
    /// From then on every store change that alters the identity is mirrored
    /// with the post-change values.
    pub fn new(storage: Rc<dyn IdentityStorage>, key: impl Into<String>, store: CredentialStore) -> Self {
        let inner = Rc::new(BridgeInner {
            storage,
            key: key.into(),
            store: store.clone(),
            restored: Cell::new(false),
            degraded: Cell::new(false),
            last_written: RefCell::new(None),
            mirror: RefCell::new(None),
        });
        let weak: Weak<BridgeInner> = Rc::downgrade(&inner);
        let subscription = store.subscribe(move |credential| {
            if let Some(inner) = weak.upgrade() {
                PersistenceBridge { inner }.mirror(&credential.identity());
            }
        });
        *inner.mirror.borrow_mut() = Some(subscription);
        Self { inner }
    }

    /// Restore the persisted identity into the store.
    ///
    /// Only the first call in a process reads storage; later calls return an
    /// empty patch and leave the store alone.
    pub fn restore_once(&self) -> CredentialPatch {
        if self.inner.restored.replace(true) {
            return CredentialPatch::default();
        }
        let Some(identity) = self.load() else {
            return CredentialPatch::default();
        };
        if identity.is_empty() {
            return CredentialPatch::default();
        }
        log::debug!("restoring persisted identity");
        *self.inner.last_written.borrow_mut() = Some(identity.clone());
        let patch = CredentialPatch::from_identity(&identity);
        self.inner.store.set_credential(patch.clone());
        patch
    }

    /// Write `identity` to storage. An empty identity removes the snapshot.
    pub fn mirror(&self, identity: &Identity) {
        if self.inner.last_written.borrow().as_ref() == Some(identity) {
            return;
        }
        *self.inner.last_written.borrow_mut() = Some(identity.clone());
        if identity.is_empty() {
            self.with_storage(|storage| storage.remove(&self.inner.key));
            return;
        }
        match serde_json::to_string(identity) {
            Ok(raw) => {
                self.with_storage(|storage| storage.write(&self.inner.key, &raw));
            }
            Err(err) => log::warn!("failed to encode identity snapshot: {err}"),
        }
    }

    /// Delete the persisted snapshot.
    pub fn clear_persisted(&self) {
        *self.inner.last_written.borrow_mut() = Some(Identity::default());
        self.with_storage(|storage| storage.remove(&self.inner.key));
    }

    /// Whether storage failed and the session is memory-only.
    pub fn is_degraded(&self) -> bool {
        self.inner.degraded.get()
    }

    fn load(&self) -> Option<Identity> {
        let raw = self.with_storage(|storage| storage.read(&self.inner.key))??;
        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => Some(identity),
            Err(err) => {
                log::warn!("discarding unreadable identity snapshot: {err}");
                self.with_storage(|storage| storage.remove(&self.inner.key));
                None
            }
        }
    }

    fn with_storage<T>(
        &self,
        op: impl FnOnce(&dyn IdentityStorage) -> Result<T, StorageError>,
    ) -> Option<T> {
        if self.inner.degraded.get() {
            return None;
        }
        match op(self.inner.storage.as_ref()) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("{}; continuing with an in-memory session", SessionError::from(err));
                self.inner.degraded.set(true);
                None
            }
        }
    }
}
