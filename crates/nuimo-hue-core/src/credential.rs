// ── Bridge credential and its store ──
//
// The store is the single owner of the credential for the life of the
// process. Reads are lock-free snapshots; the one write (after
// commissioning) goes to disk first and is swapped in whole afterwards.

use std::fmt;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// Address of a bridge plus the whitelisted username used to talk to it.
///
/// Only a credential with *both* fields set may be used for lighting
/// calls. A host-only credential can come from a hand-edited config and
/// lets commissioning skip discovery.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCredential {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub username: String,
}

impl BridgeCredential {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
        }
    }

    /// The unconfigured credential written on first run.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bridge host, if one is known.
    pub fn host(&self) -> Option<&str> {
        non_blank(&self.host)
    }

    /// The access token, if one is known.
    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    /// `true` when the credential may be used for lighting calls.
    pub fn is_configured(&self) -> bool {
        self.host().is_some() && self.username().is_some()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// The username is a bearer token; keep it out of logs.
impl fmt::Debug for BridgeCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeCredential")
            .field("host", &self.host)
            .field(
                "username",
                &if self.username.is_empty() { "" } else { "****" },
            )
            .finish()
    }
}

// ── Persistence port ─────────────────────────────────────────────────

/// Where the credential lives between runs.
///
/// Called at startup (`load`) and after a successful commissioning run
/// (`save`) only; the dispatch path never touches it.
pub trait CredentialPersistence: Send + Sync {
    fn load(&self) -> Result<BridgeCredential, StoreError>;

    fn save(&self, credential: &BridgeCredential) -> Result<(), StoreError>;
}

/// Persistence that keeps the last saved credential in memory.
///
/// For tests only; nothing is written anywhere.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Option<BridgeCredential>>,
    saves: Mutex<u32>,
}

impl MemoryPersistence {
    pub fn new(initial: BridgeCredential) -> Self {
        Self {
            saved: Mutex::new(Some(initial)),
            saves: Mutex::new(0),
        }
    }

    /// The last credential handed to [`save`](CredentialPersistence::save).
    pub fn saved(&self) -> Option<BridgeCredential> {
        self.saved.lock().ok().and_then(|guard| guard.clone())
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> u32 {
        self.saves.lock().map_or(0, |guard| *guard)
    }
}

impl CredentialPersistence for MemoryPersistence {
    fn load(&self) -> Result<BridgeCredential, StoreError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, credential: &BridgeCredential) -> Result<(), StoreError> {
        let mut saved = self.saved.lock().map_err(|_| StoreError::Persist {
            message: "memory store lock poisoned".into(),
        })?;
        *saved = Some(credential.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

impl<P: CredentialPersistence + ?Sized> CredentialPersistence for Arc<P> {
    fn load(&self) -> Result<BridgeCredential, StoreError> {
        (**self).load()
    }

    fn save(&self, credential: &BridgeCredential) -> Result<(), StoreError> {
        (**self).save(credential)
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Shared, atomically replaced bridge credential.
///
/// Readers get an `Arc` snapshot and never observe a half-updated value.
pub struct CredentialStore {
    current: ArcSwap<BridgeCredential>,
    persistence: Box<dyn CredentialPersistence>,
}

impl CredentialStore {
    /// Build a store from an already loaded credential.
    pub fn new(initial: BridgeCredential, persistence: impl CredentialPersistence + 'static) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            persistence: Box::new(persistence),
        }
    }

    /// Load the credential through `persistence` and build the store.
    pub fn load(persistence: impl CredentialPersistence + 'static) -> Result<Self, StoreError> {
        let initial = persistence.load()?;
        debug!(configured = initial.is_configured(), "loaded bridge credential");
        Ok(Self::new(initial, persistence))
    }

    /// Store without a backing file.
    pub fn in_memory(initial: BridgeCredential) -> Self {
        Self::new(initial.clone(), MemoryPersistence::new(initial))
    }

    /// The current credential (cheap `Arc` clone).
    pub fn current(&self) -> Arc<BridgeCredential> {
        self.current.load_full()
    }

    /// Persist `credential`, then make it the current value.
    ///
    /// If the save fails the in-memory value is left untouched, so no
    /// lighting command ever runs with a credential that is not on disk.
    pub fn commit(&self, credential: BridgeCredential) -> Result<(), StoreError> {
        if *self.current.load_full() == credential {
            debug!("bridge credential unchanged, nothing to persist");
            return Ok(());
        }

        self.persistence.save(&credential)?;
        info!(host = %credential.host, "bridge credential saved");
        self.current.store(Arc::new(credential));
        Ok(())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("current", &self.current.load())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FailingPersistence;

    impl CredentialPersistence for FailingPersistence {
        fn load(&self) -> Result<BridgeCredential, StoreError> {
            Ok(BridgeCredential::empty())
        }

        fn save(&self, _credential: &BridgeCredential) -> Result<(), StoreError> {
            Err(StoreError::Persist {
                message: "read-only filesystem".into(),
            })
        }
    }

    #[test]
    fn empty_credential_is_unconfigured() {
        let cred = BridgeCredential::empty();
        assert!(!cred.is_configured());
        assert_eq!(cred.host(), None);
    }

    #[test]
    fn host_only_credential_is_unconfigured() {
        let cred = BridgeCredential::new("192.168.1.2", "");
        assert!(!cred.is_configured());
        assert_eq!(cred.host(), Some("192.168.1.2"));
    }

    #[test]
    fn whitespace_username_is_unconfigured() {
        assert!(!BridgeCredential::new("192.168.1.2", "   ").is_configured());
    }

    #[test]
    fn debug_masks_username() {
        let rendered = format!("{:?}", BridgeCredential::new("10.0.0.2", "secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("10.0.0.2"));
    }

    #[test]
    fn commit_persists_before_swapping() {
        let persistence = Arc::new(MemoryPersistence::default());
        let store = CredentialStore::new(BridgeCredential::empty(), Arc::clone(&persistence));

        let cred = BridgeCredential::new("10.0.0.2", "token");
        store.commit(cred.clone()).unwrap();

        assert_eq!(persistence.saved(), Some(cred.clone()));
        assert_eq!(*store.current(), cred);
    }

    #[test]
    fn failed_save_keeps_old_value() {
        let store = CredentialStore::new(BridgeCredential::empty(), FailingPersistence);

        let result = store.commit(BridgeCredential::new("10.0.0.2", "token"));

        assert!(matches!(result, Err(StoreError::Persist { .. })));
        assert!(!store.current().is_configured());
    }

    #[test]
    fn unchanged_commit_skips_save() {
        let cred = BridgeCredential::new("10.0.0.2", "token");
        let persistence = Arc::new(MemoryPersistence::new(cred.clone()));
        let store = CredentialStore::load(Arc::clone(&persistence)).unwrap();

        store.commit(cred).unwrap();
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn snapshots_survive_replacement() {
        let store = CredentialStore::in_memory(BridgeCredential::empty());
        let before = store.current();

        store
            .commit(BridgeCredential::new("10.0.0.2", "token"))
            .unwrap();

        assert!(!before.is_configured());
        assert!(store.current().is_configured());
    }
}
