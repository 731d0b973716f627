//! Secret store adapter
//!
//! The gate keeps exactly one secret, the PIN, behind the [`SecretStore`]
//! trait. Hosts back it with the platform keystore (Keychain, Android
//! Keystore); [`MemorySecretStore`] and [`FileSecretStore`] cover tests and
//! hosts without one.
//!
//! # Contract
//!
//! - `save` overwrites whatever is stored. There is no delete-before-add.
//! - `load` returns `None` when nothing is stored or the record is unreadable.
//! - `contains` is true for an unreadable record, so the gate reports a store
//!   failure instead of offering setup over it.
//! - `delete` treats "nothing to delete" as success.

mod file;
mod memory;
pub mod status;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pin::Pin;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identity of the single stored secret
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    /// Service name the secret is filed under
    pub service: String,
    /// Account name within the service
    pub account: String,
}

impl Default for SecretKey {
    fn default() -> Self {
        Self {
            service: "pin-gate".to_string(),
            account: "pin".to_string(),
        }
    }
}

/// Store failures, already mapped away from platform numerics where possible
#[derive(Debug, Error)]
pub enum StoreError {
    /// Platform keystore returned a failure status
    #[error("keystore status {0}")]
    Status(i32),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Record in the backing slot is filed under another key
    #[error("Record belongs to {service}/{account}")]
    ForeignRecord { service: String, account: String },

    /// Backend is not usable at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Opaque storage for the single PIN secret
pub trait SecretStore: Send + Sync {
    /// Store the secret, replacing any previous value
    fn save(&self, secret: &Pin) -> StoreResult<()>;

    /// Fetch the secret if one is stored
    fn load(&self) -> Option<Pin>;

    /// Remove the secret; succeeds when nothing is stored
    fn delete(&self) -> StoreResult<()>;

    /// True when a secret is stored, readable or not
    fn contains(&self) -> bool {
        self.load().is_some()
    }
}

impl<S: SecretStore + ?Sized> SecretStore for std::sync::Arc<S> {
    fn save(&self, secret: &Pin) -> StoreResult<()> {
        (**self).save(secret)
    }

    fn load(&self) -> Option<Pin> {
        (**self).load()
    }

    fn delete(&self) -> StoreResult<()> {
        (**self).delete()
    }

    fn contains(&self) -> bool {
        (**self).contains()
    }
}
