//! In-memory secret store
//!
//! Holds the PIN for the lifetime of the process only. Useful on hosts
//! without a keystore and in tests.

use std::sync::Mutex;

use super::{SecretStore, StoreError, StoreResult};
use crate::pin::Pin;

/// Secret store backed by a mutex-guarded slot
#[derive(Default)]
pub struct MemorySecretStore {
    slot: Mutex<Option<Pin>>,
}

impl MemorySecretStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a PIN
    pub fn with_pin(pin: impl Into<Pin>) -> Self {
        Self {
            slot: Mutex::new(Some(pin.into())),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn save(&self, secret: &Pin) -> StoreResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        *slot = Some(secret.clone());
        Ok(())
    }

    fn load(&self) -> Option<Pin> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn delete(&self) -> StoreResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
